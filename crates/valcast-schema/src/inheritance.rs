//! Schema inheritance and merge logic
//!
//! A schema sees its parent's fields, handlers, and meta unless it
//! overrides them. Field overrides keep the parent's declaration position;
//! new fields append after inherited ones.

use crate::model::{FieldDef, Schema};
use std::collections::HashSet;

/// Walk the parent chain, most-derived schema first
#[must_use]
pub fn ancestry(schema: &Schema) -> Vec<&Schema> {
    let mut chain = vec![schema];
    let mut current = schema;
    while let Some(parent) = current.parent() {
        chain.push(parent.as_ref());
        current = parent.as_ref();
    }
    chain
}

/// Merge own and inherited fields into declaration order
///
/// Inherited fields come first, in the ancestor's declaration order; a
/// field redeclared by a subschema replaces the inherited one in place.
///
/// # Errors
///
/// Returns [`crate::Error::DuplicateFieldName`] if one schema declares the
/// same field name twice.
pub fn collect_fields(schema: &Schema) -> crate::Result<Vec<FieldDef>> {
    let mut merged: Vec<FieldDef> = Vec::new();

    // Least-derived first so subschema declarations override in place.
    for ancestor in ancestry(schema).into_iter().rev() {
        let mut seen: HashSet<&str> = HashSet::new();
        for field in ancestor.own_fields() {
            if !seen.insert(field.name()) {
                return Err(crate::Error::DuplicateFieldName {
                    schema: ancestor.name().to_string(),
                    field: field.name().to_string(),
                });
            }

            if let Some(existing) = merged.iter_mut().find(|f| f.name() == field.name()) {
                *existing = field.clone();
            } else {
                merged.push(field.clone());
            }
        }
    }

    Ok(merged)
}

//! Instance services
//!
//! Whole-instance operations that work on already-coerced values: merging
//! an overlay instance onto a base, and computing a field-wise diff. Both
//! require the two instances to share a schema.

use crate::instance::Instance;
use valcast_value::Value;

/// One differing field between two instances of a schema
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDiff {
    pub field: String,
    pub left: Value,
    pub right: Value,
}

/// Merge an overlay instance onto a base instance
///
/// Non-null overlay values replace the base's; null overlay values leave
/// the base's in place. Neither input is mutated.
///
/// # Errors
///
/// Fails when the instances belong to different schemas.
pub fn merge(base: &Instance, overlay: &Instance) -> crate::Result<Instance> {
    if base.name() != overlay.name() {
        return Err(crate::Error::MergeTypeMismatch {
            left: base.name().to_string(),
            right: overlay.name().to_string(),
        });
    }

    let mut merged = base.clone();
    let resolved = base.schema().resolved()?;
    for field in resolved.fields() {
        let name = field.def().name();
        match overlay.get(name) {
            Some(value) if !value.is_null() => merged.force_set(name, value.clone()),
            _ => {}
        }
    }
    Ok(merged)
}

/// List the fields on which two instances of a schema differ
///
/// Diffs are reported in declaration order with both sides' values.
///
/// # Errors
///
/// Fails when the instances belong to different schemas.
pub fn diff(left: &Instance, right: &Instance) -> crate::Result<Vec<FieldDiff>> {
    if left.name() != right.name() {
        return Err(crate::Error::DiffTypeMismatch {
            left: left.name().to_string(),
            right: right.name().to_string(),
        });
    }

    let resolved = left.schema().resolved()?;
    let mut diffs = Vec::new();
    for field in resolved.fields() {
        let name = field.def().name();
        let left_value = left.get(name).cloned().unwrap_or(Value::Null);
        let right_value = right.get(name).cloned().unwrap_or(Value::Null);
        if left_value != right_value {
            diffs.push(FieldDiff {
                field: name.to_string(),
                left: left_value,
                right: right_value,
            });
        }
    }
    Ok(diffs)
}

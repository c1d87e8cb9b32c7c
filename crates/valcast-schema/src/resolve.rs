//! Schema resolution
//!
//! Bundles the per-schema artifacts the engine consumes: merged fields
//! with resolved shapes, the handler registry, the dependency plan, and
//! the resolved meta. Built once per schema, cached for its lifetime.

use crate::inheritance::{ancestry, collect_fields};
use crate::meta::{Meta, ResolvedMeta};
use crate::model::{FieldDef, Schema};
use crate::planner;
use crate::registry::HandlerRegistry;
use crate::shape::{self, TypeShape};
use tracing::info;

/// A field with its resolved type shape
#[derive(Debug, Clone)]
pub struct ResolvedField {
    def: FieldDef,
    shape: TypeShape,
}

impl ResolvedField {
    /// The merged field declaration
    #[must_use]
    pub fn def(&self) -> &FieldDef {
        &self.def
    }

    /// The resolved type shape
    #[must_use]
    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }
}

/// The cached artifacts of a resolved schema
#[derive(Debug)]
pub struct ResolvedSchema {
    name: String,
    fields: Vec<ResolvedField>,
    plan: Vec<String>,
    handlers: HandlerRegistry,
    meta: ResolvedMeta,
}

impl ResolvedSchema {
    /// Resolve a schema declaration into its artifacts
    ///
    /// # Errors
    ///
    /// Returns the first schema-definition error found: duplicate field
    /// names, unsupported type declarations, calculated fields without a
    /// field handler, unknown dependencies, or dependency cycles.
    pub fn build(schema: &Schema) -> crate::Result<Self> {
        info!("Resolving schema: {}", schema.name());

        let fields = collect_fields(schema)?;

        let mut resolved_fields = Vec::with_capacity(fields.len());
        for field in &fields {
            let shape = shape::resolve(field.decl(), schema.name(), field.name())?;
            resolved_fields.push(ResolvedField {
                def: field.clone(),
                shape,
            });
        }

        let handlers = HandlerRegistry::build(schema)?;

        for field in &fields {
            if field.is_calculated() && handlers.field_handler(field.name()).is_none() {
                return Err(crate::Error::MissingHandlerForCalculatedField {
                    schema: schema.name().to_string(),
                    field: field.name().to_string(),
                });
            }
        }

        let plan = planner::plan(schema.name(), &fields)?;

        let meta = Meta::resolve_chain(ancestry(schema).into_iter().map(Schema::own_meta));

        Ok(Self {
            name: schema.name().to_string(),
            fields: resolved_fields,
            plan,
            handlers,
            meta,
        })
    }

    /// Schema name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Merged fields in declaration order
    #[must_use]
    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }

    /// Look up a resolved field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.def().name() == name)
    }

    /// Field evaluation order
    #[must_use]
    pub fn plan(&self) -> &[String] {
        &self.plan
    }

    /// Conversion handler registry
    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Resolved meta configuration
    #[must_use]
    pub fn meta(&self) -> &ResolvedMeta {
        &self.meta
    }
}

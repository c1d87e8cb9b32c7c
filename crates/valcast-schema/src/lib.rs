//! # valcast-schema
//!
//! Schema model, shape resolver, handler registry, and dependency planner
//! for the valcast coercion engine.
//!
//! A `Schema` is an immutable, shareable declaration of named typed fields
//! plus configuration and conversion handlers. Schemas may extend other
//! schemas; the merged view (fields, handlers, meta) is computed once on
//! first use and cached for the schema's lifetime.

pub mod inheritance;
pub mod meta;
pub mod model;
pub mod planner;
pub mod registry;
pub mod resolve;
pub mod shape;

pub use meta::{Codec, Meta, ResolvedMeta};
pub use model::{FieldDef, Handler, HandlerError, HandlerResult, Schema, SchemaBuilder, TypeDecl};
pub use registry::{HandlerRegistry, SchemaRegistry};
pub use resolve::{ResolvedField, ResolvedSchema};
pub use shape::{Primitive, TypeShape};

use thiserror::Error;

/// Errors raised while resolving a schema declaration
///
/// All of these surface on first use of a schema, never during a later
/// instantiation, and the failure is cached: repeated use of a broken
/// schema fails the same way without re-resolution.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("Unsupported type for field '{field}' of schema '{schema}': {decl}")]
    UnsupportedType {
        schema: String,
        field: String,
        decl: String,
    },

    #[error("Type handler on schema '{schema}' is keyed by an unsupported declaration: {decl}")]
    UnsupportedHandlerKey { schema: String, decl: String },

    #[error("Cyclic field dependency in schema '{schema}': {cycle:?}")]
    CyclicDependency { schema: String, cycle: Vec<String> },

    #[error("Field '{field}' of schema '{schema}' depends on unknown field '{dependency}'")]
    UnknownDependency {
        schema: String,
        field: String,
        dependency: String,
    },

    #[error("Calculated field '{field}' of schema '{schema}' has no field handler")]
    MissingHandlerForCalculatedField { schema: String, field: String },

    #[error("Duplicate field name '{field}' in schema '{schema}'")]
    DuplicateFieldName { schema: String, field: String },
}

/// Crate-local result type for schema operations.
pub type Result<T> = std::result::Result<T, Error>;

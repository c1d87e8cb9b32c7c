//! # valcast-engine
//!
//! Coercion engine, instance services, and JSON codec for valcast.
//!
//! The engine turns loosely-typed input (positional values and keyword
//! records) into fully-typed instances of a declared schema: it resolves
//! nullability, dispatches per-field and per-type conversion handlers,
//! and recurses into nested schemas and containers. Instance services
//! (merge, diff, record/JSON conversion, singleton aliasing) operate on
//! already-coerced instances.

pub mod codec;
mod coerce;
pub mod engine;
pub mod instance;
pub mod services;
pub mod singleton;

pub use codec::JsonCodec;
pub use engine::{instantiate, instantiate_named, instantiate_positional};
pub use instance::Instance;
pub use services::{FieldDiff, diff, merge};

use thiserror::Error;

/// Errors raised while instantiating or operating on instances
///
/// Instantiation errors abort the single call; no partial instance is ever
/// returned. Each error names the offending schema and, where applicable,
/// the field.
#[derive(Error, Debug)]
pub enum Error {
    /// Schema-definition error, surfaced on first use of the schema
    #[error(transparent)]
    Schema(#[from] valcast_schema::Error),

    #[error("Missing required value for field '{field}' of schema '{schema}'")]
    MissingRequiredValue { schema: String, field: String },

    #[error("Null supplied to non-nullable field '{field}' of schema '{schema}'")]
    NullOnNonNullableField { schema: String, field: String },

    #[error("Value for field '{field}' of schema '{schema}' does not fit the nested schema: {reason}")]
    StructuralMismatch {
        schema: String,
        field: String,
        reason: String,
    },

    #[error("Conversion failed for field '{field}' of schema '{schema}': {message}")]
    Conversion {
        schema: String,
        field: String,
        message: String,
    },

    #[error("Field '{field}' of schema '{schema}' supplied both positionally and by name")]
    DuplicateArgument { schema: String, field: String },

    #[error("Schema '{schema}' has no field '{field}'")]
    UnexpectedArgument { schema: String, field: String },

    #[error("Schema '{schema}' takes {expected} positional values, {given} given")]
    TooManyPositional {
        schema: String,
        expected: usize,
        given: usize,
    },

    #[error("Instance of frozen schema '{schema}' cannot be mutated")]
    FrozenInstance { schema: String },

    #[error("Codec error for schema '{schema}': {message}")]
    Codec { schema: String, message: String },

    #[error("Cannot diff instances of different schemas: '{left}' vs '{right}'")]
    DiffTypeMismatch { left: String, right: String },

    #[error("Cannot merge instances of different schemas: '{left}' vs '{right}'")]
    MergeTypeMismatch { left: String, right: String },
}

impl Error {
    /// Build a conversion error for a schema field.
    pub fn conversion(
        schema: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Conversion {
            schema: schema.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build a structural-mismatch error for a schema field.
    pub fn structural_mismatch(
        schema: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::StructuralMismatch {
            schema: schema.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Crate-local result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

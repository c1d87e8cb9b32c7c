#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # valcast-value
//!
//! Dynamic value model and ordered records for the valcast coercion engine.
//!
//! This crate provides the loosely-typed `Value` representation that the
//! engine consumes as raw input and produces as coerced output, together
//! with `Record`, an insertion-ordered field map used for keyword
//! arguments, in-progress instances, and structural conversion.

/// Numeric conversion helpers between value variants.
pub mod numeric;
/// Insertion-ordered field-name to value map.
pub mod record;
/// Core dynamic value type.
pub mod value;

/// Ordered field map used for keyword arguments and instance payloads.
pub use record::Record;
/// Dynamic value primitives and containers.
pub use value::Value;

use thiserror::Error;

/// Errors that can occur when working with dynamic values
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("Conversion error in {context}: {message}")]
    Conversion { context: String, message: String },
}

impl Error {
    /// Build a conversion error with conversion context.
    pub fn conversion(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// Crate-local result type for value operations.
pub type Result<T> = std::result::Result<T, Error>;

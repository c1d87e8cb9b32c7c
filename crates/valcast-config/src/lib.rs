//! # valcast-config
//!
//! Environment-backed construction for valcast schemas.
//!
//! Field values are read from process environment entries named
//! `<PREFIX>_<FIELD_NAME_UPPERCASED>` and fed through the full coercion
//! pipeline, so a config schema gets the same typing guarantees as any
//! other instantiation. String-to-bool handling is deliberately lenient
//! for config sources ("y", "yes", "1", "true").

pub mod env;
pub mod handlers;

pub use env::{EnvLoader, env_record, from_env};
pub use handlers::{config_schema, lenient_bool};

use thiserror::Error;

/// Errors raised while building instances from the environment
#[derive(Error, Debug)]
pub enum Error {
    /// Coercion of the collected environment values failed
    #[error(transparent)]
    Engine(#[from] valcast_engine::Error),

    /// An environment entry exists but is not valid Unicode
    #[error("Environment entry '{variable}' for field '{field}' of schema '{schema}' is not valid Unicode")]
    NotUnicode {
        schema: String,
        field: String,
        variable: String,
    },

    /// A schema name was not found in the loader's registry
    #[error("No schema named '{name}' is registered")]
    UnknownSchema { name: String },
}

impl From<valcast_schema::Error> for Error {
    fn from(error: valcast_schema::Error) -> Self {
        Self::Engine(valcast_engine::Error::Schema(error))
    }
}

/// Crate-local result type for config operations.
pub type Result<T> = std::result::Result<T, Error>;

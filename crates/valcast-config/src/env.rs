//! Environment collection
//!
//! Collects raw field values from process environment entries and hands
//! them to the engine as a keyword record. Missing entries are simply
//! omitted, so field defaults apply; fields marked `ignore_env` and
//! calculated fields are never read from the environment.

use std::sync::Arc;
use tracing::{debug, trace};
use valcast_engine::Instance;
use valcast_schema::{Schema, SchemaRegistry};
use valcast_value::{Record, Value};

/// Environment variable name for a field
fn variable_name(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_uppercase()
    } else {
        format!("{}_{}", prefix.to_uppercase(), field.to_uppercase())
    }
}

/// Collect a keyword record for a schema from the environment
///
/// Every present entry arrives as a string value; coercion happens later
/// in the engine.
///
/// # Errors
///
/// Fails when the schema cannot be resolved or an entry is not valid
/// Unicode.
pub fn env_record(schema: &Arc<Schema>, prefix: &str) -> crate::Result<Record> {
    let resolved = schema.resolved()?;
    let mut record = Record::new();

    for field in resolved.fields() {
        let def = field.def();
        if def.ignores_env() || def.is_calculated() {
            continue;
        }
        let variable = variable_name(prefix, def.name());
        match std::env::var(&variable) {
            Ok(text) => {
                trace!("Environment entry {variable} feeds field {}", def.name());
                record.insert(def.name(), Value::Str(text));
            }
            Err(std::env::VarError::NotPresent) => {}
            Err(std::env::VarError::NotUnicode(_)) => {
                return Err(crate::Error::NotUnicode {
                    schema: resolved.name().to_string(),
                    field: def.name().to_string(),
                    variable,
                });
            }
        }
    }

    debug!(
        "Collected {} environment entries for schema: {}",
        record.len(),
        resolved.name()
    );
    Ok(record)
}

/// Instantiate a schema from the environment
///
/// # Errors
///
/// Fails on collection errors and on any coercion error of the collected
/// values.
pub fn from_env(schema: &Arc<Schema>, prefix: &str) -> crate::Result<Instance> {
    let keywords = env_record(schema, prefix)?;
    Ok(valcast_engine::instantiate_named(schema, keywords)?)
}

/// Registry-backed environment loader
///
/// Holds named config schemas and instantiates them from the environment
/// by name. Useful when a process assembles its configuration from
/// several independently declared schemas.
#[derive(Debug, Default)]
pub struct EnvLoader {
    registry: SchemaRegistry,
    prefix: String,
}

impl EnvLoader {
    /// Create a loader with a shared variable-name prefix
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            registry: SchemaRegistry::default(),
            prefix: prefix.into(),
        }
    }

    /// Register a config schema under its own name
    pub fn register(&self, schema: Arc<Schema>) {
        self.registry.register(schema);
    }

    /// Instantiate a registered schema from the environment
    ///
    /// # Errors
    ///
    /// Fails when the name is unknown or the environment values do not
    /// coerce.
    pub fn load(&self, name: &str) -> crate::Result<Instance> {
        let schema = self
            .registry
            .get(name)
            .ok_or_else(|| crate::Error::UnknownSchema {
                name: name.to_string(),
            })?;
        from_env(&schema, &self.prefix)
    }
}

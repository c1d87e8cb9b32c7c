//! Handler and schema registries

use crate::inheritance::ancestry;
use crate::model::{Handler, Schema};
use crate::shape::{self, TypeShape};
use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Per-schema conversion handler registry
///
/// Built once at schema resolution by walking handler declarations from
/// the most-derived schema to the least-derived one; a key is inserted
/// only if not already present, so a subschema handler supersedes an
/// inherited handler with the same key.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    type_handlers: HashMap<String, Handler>,
    field_handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    /// Build the registry for a schema and its ancestry
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnsupportedHandlerKey`] when a type handler
    /// is keyed by a declaration that does not resolve to a shape.
    pub fn build(schema: &Schema) -> crate::Result<Self> {
        let mut registry = HandlerRegistry::default();

        // Most-derived first; first insertion wins.
        for ancestor in ancestry(schema) {
            for (decl, handler) in ancestor.own_type_handlers() {
                let key = shape::resolve(decl, ancestor.name(), "")
                    .map_err(|_| crate::Error::UnsupportedHandlerKey {
                        schema: ancestor.name().to_string(),
                        decl: decl.describe(),
                    })?
                    .key();
                registry
                    .type_handlers
                    .entry(key)
                    .or_insert_with(|| Arc::clone(handler));
            }
            for (field, handler) in ancestor.own_field_handlers() {
                registry
                    .field_handlers
                    .entry(field.clone())
                    .or_insert_with(|| Arc::clone(handler));
            }
        }

        Ok(registry)
    }

    /// Look up a type handler by resolved shape
    #[must_use]
    pub fn type_handler(&self, shape: &TypeShape) -> Option<&Handler> {
        self.type_handlers.get(&shape.key())
    }

    /// Look up a field handler by field name
    #[must_use]
    pub fn field_handler(&self, field: &str) -> Option<&Handler> {
        self.field_handlers.get(field)
    }

    /// Number of registered type handlers
    #[must_use]
    pub fn type_handler_count(&self) -> usize {
        self.type_handlers.len()
    }

    /// Number of registered field handlers
    #[must_use]
    pub fn field_handler_count(&self) -> usize {
        self.field_handlers.len()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("type_handlers", &self.type_handlers.keys())
            .field("field_handlers", &self.field_handlers.keys())
            .finish()
    }
}

/// Process-wide schema registry keyed by name
///
/// Safe for concurrent registration and lookup.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: DashMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            schemas: DashMap::new(),
        }
    }

    /// Register a schema under its own name
    pub fn register(&self, schema: Arc<Schema>) {
        self.schemas.insert(schema.name().to_string(), schema);
    }

    /// Get a schema by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).map(|entry| Arc::clone(&entry))
    }

    /// Check if a schema exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }
}

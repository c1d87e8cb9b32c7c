//! Singleton instance store
//!
//! Process-wide store backing `Meta::singleton` schemas, keyed by schema
//! name. The first successful instantiation populates the entry; later
//! calls return the stored instance and their arguments are ignored.

use crate::instance::Instance;
use dashmap::DashMap;
use std::sync::OnceLock;
use tracing::debug;

static STORE: OnceLock<DashMap<String, Instance>> = OnceLock::new();

fn store() -> &'static DashMap<String, Instance> {
    STORE.get_or_init(DashMap::new)
}

/// Look up the stored instance for a schema
pub(crate) fn get(schema: &str) -> Option<Instance> {
    let found = store().get(schema).map(|entry| entry.clone());
    if found.is_some() {
        debug!("Singleton store hit for schema: {schema}");
    }
    found
}

/// Store an instance unless one is already present, returning the winner
pub(crate) fn get_or_insert(schema: &str, instance: Instance) -> Instance {
    store()
        .entry(schema.to_string())
        .or_insert_with(|| {
            debug!("Singleton store populated for schema: {schema}");
            instance
        })
        .clone()
}

/// Drop the stored instance for a schema
///
/// The next instantiation of the schema re-runs coercion and stores its
/// result. Mainly useful in tests and long-lived processes that reload
/// configuration.
pub fn evict(schema: &str) -> bool {
    store().remove(schema).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::instantiate_named;
    use valcast_schema::{FieldDef, Meta, Schema, TypeDecl};
    use valcast_value::{Record, Value};

    #[test]
    fn test_first_instantiation_wins() {
        let schema = Schema::builder("SingletonStoreTest")
            .meta(Meta::new().singleton(true))
            .field(FieldDef::new("n", TypeDecl::Int))
            .build();

        evict("SingletonStoreTest");

        let keywords: Record = [("n", Value::Int(1))].into_iter().collect();
        let first = instantiate_named(&schema, keywords).unwrap();

        let keywords: Record = [("n", Value::Int(2))].into_iter().collect();
        let second = instantiate_named(&schema, keywords).unwrap();

        assert_eq!(first.get("n"), Some(&Value::Int(1)));
        assert_eq!(second.get("n"), Some(&Value::Int(1)));

        assert!(evict("SingletonStoreTest"));
        let keywords: Record = [("n", Value::Int(3))].into_iter().collect();
        let third = instantiate_named(&schema, keywords).unwrap();
        assert_eq!(third.get("n"), Some(&Value::Int(3)));
        evict("SingletonStoreTest");
    }
}

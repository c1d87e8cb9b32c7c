//! Coercion engine
//!
//! Per-instantiation driver: binds raw positional/keyword values to
//! fields, walks fields in dependency-plan order, and dispatches each
//! value through the handler-precedence rules into its coerced form.

use crate::coerce::{self, CoerceCtx};
use crate::instance::Instance;
use crate::singleton;
use std::sync::Arc;
use tracing::trace;
use valcast_schema::{ResolvedField, ResolvedSchema, Schema};
use valcast_value::{Record, Value};

/// Instantiate a schema from positional and keyword values
///
/// Positional values bind to fields in declaration order; keyword values
/// bind by name. Supplying a field both ways is a call-site error. The
/// first failing field aborts the call; no partial instance is returned.
///
/// # Errors
///
/// Returns a schema-resolution error on first use of a broken schema, or
/// any instantiation-time error of the taxonomy in [`crate::Error`].
pub fn instantiate(
    schema: &Arc<Schema>,
    positional: Vec<Value>,
    keywords: Record,
) -> crate::Result<Instance> {
    let resolved = schema.resolved()?;

    if resolved.meta().singleton {
        if let Some(existing) = singleton::get(resolved.name()) {
            return Ok(existing);
        }
    }

    let mut bound = bind_arguments(&resolved, positional, keywords)?;
    let mut in_progress = Record::for_schema(resolved.name());

    for name in resolved.plan() {
        let field = resolved
            .field(name)
            .ok_or_else(|| crate::Error::UnexpectedArgument {
                schema: resolved.name().to_string(),
                field: name.clone(),
            })?;
        trace!("Coercing field {}.{}", resolved.name(), name);
        let raw = bound.remove(name);
        let coerced = coerce_field(&resolved, field, raw, &in_progress)?;
        in_progress.insert(name.clone(), coerced);
    }

    // Plan order served the handlers; the stored record follows
    // declaration order.
    let mut values = Record::for_schema(resolved.name());
    for field in resolved.fields() {
        if let Some(value) = in_progress.remove(field.def().name()) {
            values.insert(field.def().name(), value);
        }
    }

    let instance = Instance::from_parts(Arc::clone(schema), values);

    if resolved.meta().singleton {
        return Ok(singleton::get_or_insert(resolved.name(), instance));
    }

    Ok(instance)
}

/// Instantiate from positional values only
///
/// # Errors
///
/// See [`instantiate`].
pub fn instantiate_positional(
    schema: &Arc<Schema>,
    positional: Vec<Value>,
) -> crate::Result<Instance> {
    instantiate(schema, positional, Record::new())
}

/// Instantiate from keyword values only
///
/// # Errors
///
/// See [`instantiate`].
pub fn instantiate_named(schema: &Arc<Schema>, keywords: Record) -> crate::Result<Instance> {
    instantiate(schema, Vec::new(), keywords)
}

/// Bind raw arguments to field names
fn bind_arguments(
    resolved: &ResolvedSchema,
    positional: Vec<Value>,
    keywords: Record,
) -> crate::Result<Record> {
    let fields = resolved.fields();
    if positional.len() > fields.len() {
        return Err(crate::Error::TooManyPositional {
            schema: resolved.name().to_string(),
            expected: fields.len(),
            given: positional.len(),
        });
    }

    let mut bound = Record::new();
    for (field, value) in fields.iter().zip(positional) {
        bound.insert(field.def().name(), value);
    }

    for (name, value) in keywords.into_entries() {
        if resolved.field(&name).is_none() {
            return Err(crate::Error::UnexpectedArgument {
                schema: resolved.name().to_string(),
                field: name,
            });
        }
        if bound.contains(&name) {
            return Err(crate::Error::DuplicateArgument {
                schema: resolved.name().to_string(),
                field: name,
            });
        }
        bound.insert(name, value);
    }

    Ok(bound)
}

/// Coerce a single field value
///
/// Order of gates: raw-value resolution (argument, then default, then
/// missing-required failure); calculated fields go straight to their
/// field handler; the null/nullable gate; the skip-typecast gate; then
/// handler-precedence dispatch.
fn coerce_field(
    resolved: &ResolvedSchema,
    field: &ResolvedField,
    raw: Option<Value>,
    in_progress: &Record,
) -> crate::Result<Value> {
    let def = field.def();

    let raw = match raw {
        Some(value) => value,
        None => match def.default_value() {
            Some(value) => value,
            None => {
                return Err(crate::Error::MissingRequiredValue {
                    schema: resolved.name().to_string(),
                    field: def.name().to_string(),
                });
            }
        },
    };

    let ctx = CoerceCtx {
        schema: resolved.name(),
        field: def.name(),
        record: in_progress,
        handlers: resolved.handlers(),
    };

    // A calculated field is produced entirely by its handler, which runs
    // even when the raw value is null. Resolution guarantees the handler
    // exists.
    if def.is_calculated() {
        if let Some(handler) = resolved.handlers().field_handler(def.name()) {
            return coerce::invoke(handler, raw, &ctx);
        }
        return Err(valcast_schema::Error::MissingHandlerForCalculatedField {
            schema: resolved.name().to_string(),
            field: def.name().to_string(),
        }
        .into());
    }

    if raw.is_null() {
        if def.is_nullable() {
            return Ok(Value::Null);
        }
        return Err(crate::Error::NullOnNonNullableField {
            schema: resolved.name().to_string(),
            field: def.name().to_string(),
        });
    }

    if def.skips_typecast() {
        return Ok(raw);
    }

    if let Some(handler) = resolved.handlers().field_handler(def.name()) {
        return coerce::invoke(handler, raw, &ctx);
    }

    coerce::coerce(raw, field.shape(), &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use valcast_schema::{FieldDef, TypeDecl};

    fn point_schema() -> Arc<Schema> {
        Schema::builder("EnginePoint")
            .field(FieldDef::new("x", TypeDecl::Int))
            .field(FieldDef::new("y", TypeDecl::Int))
            .build()
    }

    #[test]
    fn test_positional_binding_follows_declaration_order() {
        let schema = point_schema();
        let instance =
            instantiate_positional(&schema, vec![Value::Str("1".into()), Value::Int(2)]).unwrap();
        assert_eq!(instance.get("x"), Some(&Value::Int(1)));
        assert_eq!(instance.get("y"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_duplicate_argument_is_rejected() {
        let schema = point_schema();
        let keywords: Record = [("x", Value::Int(9))].into_iter().collect();
        let err = instantiate(&schema, vec![Value::Int(1), Value::Int(2)], keywords).unwrap_err();
        assert!(matches!(err, crate::Error::DuplicateArgument { .. }));
    }

    #[test]
    fn test_unknown_keyword_is_rejected() {
        let schema = point_schema();
        let keywords: Record = [
            ("x", Value::Int(1)),
            ("y", Value::Int(2)),
            ("z", Value::Int(3)),
        ]
        .into_iter()
        .collect();
        let err = instantiate_named(&schema, keywords).unwrap_err();
        assert!(matches!(err, crate::Error::UnexpectedArgument { .. }));
    }

    #[test]
    fn test_too_many_positional_is_rejected() {
        let schema = point_schema();
        let err = instantiate_positional(
            &schema,
            vec![Value::Int(1), Value::Int(2), Value::Int(3)],
        )
        .unwrap_err();
        assert!(matches!(err, crate::Error::TooManyPositional { .. }));
    }

    #[test]
    fn test_missing_required_value() {
        let schema = point_schema();
        let keywords: Record = [("x", Value::Int(1))].into_iter().collect();
        let err = instantiate_named(&schema, keywords).unwrap_err();
        match err {
            crate::Error::MissingRequiredValue { field, .. } => assert_eq!(field, "y"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_default_applies_when_value_missing() {
        let schema = Schema::builder("Defaulted")
            .field(FieldDef::new("x", TypeDecl::Int))
            .field(FieldDef::new("y", TypeDecl::Int).default(Value::Int(10)))
            .build();
        let instance = instantiate_positional(&schema, vec![Value::Int(1)]).unwrap();
        assert_eq!(instance.get("y"), Some(&Value::Int(10)));
    }

    #[test]
    fn test_default_factory_runs_per_instantiation() {
        let schema = Schema::builder("Factory")
            .field(
                FieldDef::new("items", TypeDecl::list(TypeDecl::Int))
                    .default_factory(|| Value::List(Vec::new())),
            )
            .build();
        let instance = instantiate_named(&schema, Record::new()).unwrap();
        assert_eq!(instance.get("items"), Some(&Value::List(Vec::new())));
    }
}

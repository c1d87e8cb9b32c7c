//! Recursive value coercion
//!
//! Type-directed dispatch for a single value against a resolved shape.
//! Used for field values (after the field-handler check in the engine)
//! and element-wise for container contents, where only type-handler and
//! structural rules apply.

use crate::engine;
use std::sync::Arc;
use valcast_schema::{Handler, HandlerRegistry, Primitive, Schema, TypeShape};
use valcast_value::{Record, Value, numeric};

/// Context threaded through a coercion tree
///
/// Carries the owning schema and field for diagnostics, the in-progress
/// record handlers may read, and the handler registry consulted for
/// type-handler dispatch.
pub(crate) struct CoerceCtx<'a> {
    pub schema: &'a str,
    pub field: &'a str,
    pub record: &'a Record,
    pub handlers: &'a HandlerRegistry,
}

impl CoerceCtx<'_> {
    fn conversion_error(&self, message: impl Into<String>) -> crate::Error {
        crate::Error::conversion(self.schema, self.field, message)
    }
}

/// Coerce a value to a shape
///
/// A type handler registered for the exact shape takes precedence over
/// the structural rules; below that, nested schemas unpack through the
/// fixed strategy ladder and containers coerce element-wise.
pub(crate) fn coerce(value: Value, shape: &TypeShape, ctx: &CoerceCtx<'_>) -> crate::Result<Value> {
    if let Some(handler) = ctx.handlers.type_handler(shape) {
        return invoke(handler, value, ctx);
    }

    match shape {
        TypeShape::Nested(nested) => coerce_nested(value, nested, ctx),
        TypeShape::List(element) => {
            let items = container_items(value, "list", ctx)?;
            let coerced = coerce_elements(items, element, ctx)?;
            Ok(Value::List(coerced))
        }
        TypeShape::Set(element) => {
            let items = container_items(value, "set", ctx)?;
            let mut coerced = Vec::with_capacity(items.len());
            for item in coerce_elements(items, element, ctx)? {
                if !coerced.contains(&item) {
                    coerced.push(item);
                }
            }
            Ok(Value::Set(coerced))
        }
        TypeShape::Map(key_shape, value_shape) => coerce_map(value, key_shape, value_shape, ctx),
        TypeShape::Primitive(primitive) => coerce_primitive(value, *primitive, ctx),
        TypeShape::Opaque => Ok(value),
    }
}

/// Invoke a conversion handler, wrapping its failure as a conversion error
pub(crate) fn invoke(
    handler: &Handler,
    value: Value,
    ctx: &CoerceCtx<'_>,
) -> crate::Result<Value> {
    handler(ctx.record, &value).map_err(|error| ctx.conversion_error(error.to_string()))
}

/// Unpack a value into a nested schema instance
///
/// Strategies are tried in a fixed order: an already-coerced instance of
/// the schema passes through; a string-keyed mapping instantiates by
/// keywords; an ordered sequence instantiates positionally; anything else
/// is attempted as a single positional argument.
fn coerce_nested(
    value: Value,
    nested: &Arc<Schema>,
    ctx: &CoerceCtx<'_>,
) -> crate::Result<Value> {
    match value {
        Value::Record(record) if record.schema() == Some(nested.name()) => {
            Ok(Value::Record(record))
        }
        Value::Record(record) => {
            let instance = engine::instantiate(nested, Vec::new(), record)?;
            Ok(Value::Record(instance.into_values()))
        }
        Value::Map(entries) => {
            let keywords = string_keyed(entries).map_err(|value| {
                crate::Error::structural_mismatch(
                    ctx.schema,
                    ctx.field,
                    format!(
                        "mapping for schema '{}' has non-string key of type {}",
                        nested.name(),
                        value.type_name()
                    ),
                )
            })?;
            let instance = engine::instantiate(nested, Vec::new(), keywords)?;
            Ok(Value::Record(instance.into_values()))
        }
        Value::List(items) => {
            let instance = engine::instantiate(nested, items, Record::new())?;
            Ok(Value::Record(instance.into_values()))
        }
        other => {
            let type_name = other.type_name();
            match engine::instantiate(nested, vec![other], Record::new()) {
                Ok(instance) => Ok(Value::Record(instance.into_values())),
                Err(_) => Err(crate::Error::structural_mismatch(
                    ctx.schema,
                    ctx.field,
                    format!(
                        "cannot unpack {} into schema '{}'",
                        type_name,
                        nested.name()
                    ),
                )),
            }
        }
    }
}

fn coerce_map(
    value: Value,
    key_shape: &TypeShape,
    value_shape: &TypeShape,
    ctx: &CoerceCtx<'_>,
) -> crate::Result<Value> {
    let entries = match value {
        Value::Map(entries) => entries,
        Value::Record(record) => record
            .into_entries()
            .into_iter()
            .map(|(name, value)| (Value::Str(name), value))
            .collect(),
        other => {
            return Err(ctx.conversion_error(format!(
                "cannot coerce {} to a map",
                other.type_name()
            )));
        }
    };

    let mut coerced = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        coerced.push((coerce(key, key_shape, ctx)?, coerce(value, value_shape, ctx)?));
    }
    Ok(Value::Map(coerced))
}

fn container_items(
    value: Value,
    target: &str,
    ctx: &CoerceCtx<'_>,
) -> crate::Result<Vec<Value>> {
    match value {
        Value::List(items) | Value::Set(items) => Ok(items),
        other => Err(ctx.conversion_error(format!(
            "cannot coerce {} to a {target}",
            other.type_name()
        ))),
    }
}

fn coerce_elements(
    items: Vec<Value>,
    element: &TypeShape,
    ctx: &CoerceCtx<'_>,
) -> crate::Result<Vec<Value>> {
    items
        .into_iter()
        .map(|item| coerce(item, element, ctx))
        .collect()
}

/// Convert a value to a primitive, via direct constructor conversion when
/// the runtime type differs
fn coerce_primitive(
    value: Value,
    primitive: Primitive,
    ctx: &CoerceCtx<'_>,
) -> crate::Result<Value> {
    let context = format!("{}.{}", ctx.schema, ctx.field);
    match primitive {
        Primitive::Bool => match value {
            Value::Bool(_) => Ok(value),
            other => numeric::value_to_bool(&other, &context)
                .map(Value::Bool)
                .map_err(|error| ctx.conversion_error(error.to_string())),
        },
        Primitive::Int => match value {
            Value::Int(_) => Ok(value),
            other => numeric::value_to_i64(&other, &context)
                .map(Value::Int)
                .map_err(|error| ctx.conversion_error(error.to_string())),
        },
        Primitive::Float => match value {
            Value::Float(_) => Ok(value),
            other => numeric::value_to_f64(&other, &context)
                .map(Value::Float)
                .map_err(|error| ctx.conversion_error(error.to_string())),
        },
        Primitive::Str => match value {
            Value::Str(_) => Ok(value),
            other => other
                .as_display_string()
                .map(Value::Str)
                .ok_or_else(|| {
                    ctx.conversion_error(format!(
                        "cannot convert {} to str",
                        other.type_name()
                    ))
                }),
        },
        Primitive::Bytes => match value {
            Value::Bytes(_) => Ok(value),
            Value::Str(s) => Ok(Value::Bytes(s.into_bytes())),
            other => Err(ctx.conversion_error(format!(
                "cannot convert {} to bytes",
                other.type_name()
            ))),
        },
    }
}

fn string_keyed(entries: Vec<(Value, Value)>) -> std::result::Result<Record, Value> {
    let mut record = Record::new();
    for (key, value) in entries {
        match key {
            Value::Str(name) => record.insert(name, value),
            other => return Err(other),
        }
    }
    Ok(record)
}

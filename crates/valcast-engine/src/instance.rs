//! Coerced instances
//!
//! An [`Instance`] is the output of instantiation: a schema handle plus a
//! record of fully-coerced field values in declaration order. Equality,
//! ordering, mutation, and serialization behavior are all governed by the
//! schema's resolved meta.

use crate::codec::JsonCodec;
use std::cmp::Ordering;
use std::sync::Arc;
use valcast_schema::{Codec, ResolvedSchema, Schema, TypeShape};
use valcast_value::{Record, Value};

/// A fully-coerced instance of a schema
#[derive(Debug, Clone)]
pub struct Instance {
    schema: Arc<Schema>,
    values: Record,
}

impl Instance {
    pub(crate) fn from_parts(schema: Arc<Schema>, values: Record) -> Self {
        Self { schema, values }
    }

    // Internal store for services that construct a new instance rather
    // than mutate an existing one, so the frozen gate does not apply.
    pub(crate) fn force_set(&mut self, field: &str, value: Value) {
        self.values.insert(field, value);
    }

    /// The schema this instance was coerced against
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Schema name
    #[must_use]
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Look up a field value by name
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// All field values, in declaration order
    #[must_use]
    pub fn values(&self) -> &Record {
        &self.values
    }

    /// Consume the instance, yielding its value record
    #[must_use]
    pub fn into_values(self) -> Record {
        self.values
    }

    /// Replace a field value
    ///
    /// The replacement is stored as-is; no coercion is re-run.
    ///
    /// # Errors
    ///
    /// Fails on instances of frozen schemas and on unknown field names.
    pub fn set(&mut self, field: &str, value: Value) -> crate::Result<()> {
        let resolved = self.schema.resolved()?;
        if resolved.meta().frozen {
            return Err(crate::Error::FrozenInstance {
                schema: resolved.name().to_string(),
            });
        }
        if resolved.field(field).is_none() {
            return Err(crate::Error::UnexpectedArgument {
                schema: resolved.name().to_string(),
                field: field.to_string(),
            });
        }
        self.values.insert(field, value);
        Ok(())
    }

    /// Convert the instance to a plain record
    ///
    /// Nested instances whose schemas declare `hide_in_record` are omitted,
    /// recursively, including inside lists, sets, and maps.
    ///
    /// # Errors
    ///
    /// Fails when this schema or a nested schema cannot be resolved.
    pub fn to_record(&self) -> crate::Result<Record> {
        self.to_record_with(false)
    }

    /// Convert the instance to a plain record, optionally keeping fields
    /// that `hide_in_record` would omit
    ///
    /// # Errors
    ///
    /// Fails when this schema or a nested schema cannot be resolved.
    pub fn to_record_with(&self, include_hidden: bool) -> crate::Result<Record> {
        let resolved = self.schema.resolved()?;
        record_of(&resolved, &self.values, include_hidden)
    }

    /// Serialize the instance through its schema's codec
    ///
    /// The codec defaults to JSON unless the schema's meta substitutes
    /// another one. `hide_in_record` schemas are omitted here too.
    ///
    /// # Errors
    ///
    /// Fails on resolution errors or when the codec rejects the value.
    pub fn to_json(&self) -> crate::Result<String> {
        let resolved = self.schema.resolved()?;
        let record = self.to_record()?;
        encode_with(&resolved, &Value::Record(record))
    }

    /// Deserialize text into an instance of a schema
    ///
    /// The decoded value must be a string-keyed mapping; its entries bind
    /// as keyword values and pass through the full coercion pipeline.
    ///
    /// # Errors
    ///
    /// Fails when the text does not decode, decodes to something other
    /// than a mapping, or the coercion itself fails.
    pub fn from_json(schema: &Arc<Schema>, text: &str) -> crate::Result<Self> {
        let resolved = schema.resolved()?;
        let decoded = decode_with(&resolved, text)?;
        let keywords = match decoded {
            Value::Record(record) => record,
            Value::Map(entries) => {
                let mut record = Record::new();
                for (key, value) in entries {
                    match key {
                        Value::Str(name) => record.insert(name, value),
                        other => {
                            return Err(crate::Error::Codec {
                                schema: resolved.name().to_string(),
                                message: format!(
                                    "decoded mapping has non-string key of type {}",
                                    other.type_name()
                                ),
                            });
                        }
                    }
                }
                record
            }
            other => {
                return Err(crate::Error::Codec {
                    schema: resolved.name().to_string(),
                    message: format!("decoded value is {}, expected a mapping", other.type_name()),
                });
            }
        };
        crate::engine::instantiate_named(schema, keywords)
    }

    /// Field-wise ordering, when the schema opts in via `Meta::order`
    ///
    /// Fields compare in declaration order; the first unequal field
    /// decides. Returns `None` when ordering is disabled, the schemas
    /// differ, or a pair of values has no defined order.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        let resolved = self.schema.resolved().ok()?;
        if !resolved.meta().order || self.schema.name() != other.schema.name() {
            return None;
        }
        for field in resolved.fields() {
            let left = self.get(field.def().name())?;
            let right = other.get(field.def().name())?;
            match value_ordering(left, right)? {
                Ordering::Equal => {}
                unequal => return Some(unequal),
            }
        }
        Some(Ordering::Equal)
    }
}

/// Value-based equality, gated by `Meta::eq`
///
/// Instances of schemas that disable `eq` never compare equal, not even
/// to themselves.
impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        let Ok(resolved) = self.schema.resolved() else {
            return false;
        };
        resolved.meta().eq
            && self.schema.name() == other.schema.name()
            && self.values.same_fields(&other.values)
    }
}

fn encode_with(resolved: &ResolvedSchema, value: &Value) -> crate::Result<String> {
    let encoded = match &resolved.meta().codec {
        Some(codec) => codec.encode(value),
        None => JsonCodec.encode(value),
    };
    encoded.map_err(|error| crate::Error::Codec {
        schema: resolved.name().to_string(),
        message: error.to_string(),
    })
}

fn decode_with(resolved: &ResolvedSchema, text: &str) -> crate::Result<Value> {
    let decoded = match &resolved.meta().codec {
        Some(codec) => codec.decode(text),
        None => JsonCodec.decode(text),
    };
    decoded.map_err(|error| crate::Error::Codec {
        schema: resolved.name().to_string(),
        message: error.to_string(),
    })
}

/// Build the record form of a value set, applying `hide_in_record`
fn record_of(
    resolved: &ResolvedSchema,
    values: &Record,
    include_hidden: bool,
) -> crate::Result<Record> {
    let mut out = Record::for_schema(resolved.name());
    for field in resolved.fields() {
        let Some(value) = values.get(field.def().name()) else {
            continue;
        };
        match record_value(value, field.shape(), include_hidden)? {
            Some(converted) => out.insert(field.def().name(), converted),
            None => {}
        }
    }
    Ok(out)
}

/// Record form of a single value; `None` means the value is hidden
fn record_value(
    value: &Value,
    shape: &TypeShape,
    include_hidden: bool,
) -> crate::Result<Option<Value>> {
    match shape {
        TypeShape::Nested(nested) => {
            let nested_resolved = nested.resolved()?;
            if nested_resolved.meta().hide_in_record && !include_hidden {
                return Ok(None);
            }
            match value {
                Value::Record(record) => {
                    let converted = record_of(&nested_resolved, record, include_hidden)?;
                    Ok(Some(Value::Record(converted)))
                }
                // Nullable nested fields hold plain nulls.
                other => Ok(Some(other.clone())),
            }
        }
        TypeShape::List(element) => {
            let Value::List(items) = value else {
                return Ok(Some(value.clone()));
            };
            let mut converted = Vec::with_capacity(items.len());
            for item in items {
                if let Some(item) = record_value(item, element, include_hidden)? {
                    converted.push(item);
                }
            }
            Ok(Some(Value::List(converted)))
        }
        TypeShape::Set(element) => {
            let Value::Set(items) = value else {
                return Ok(Some(value.clone()));
            };
            let mut converted = Vec::with_capacity(items.len());
            for item in items {
                if let Some(item) = record_value(item, element, include_hidden)? {
                    converted.push(item);
                }
            }
            Ok(Some(Value::Set(converted)))
        }
        TypeShape::Map(_, value_shape) => {
            let Value::Map(entries) = value else {
                return Ok(Some(value.clone()));
            };
            let mut converted = Vec::with_capacity(entries.len());
            for (key, entry) in entries {
                if let Some(entry) = record_value(entry, value_shape, include_hidden)? {
                    converted.push((key.clone(), entry));
                }
            }
            Ok(Some(Value::Map(converted)))
        }
        TypeShape::Primitive(_) | TypeShape::Opaque => Ok(Some(value.clone())),
    }
}

/// Ordering for a pair of coerced values of the same field
fn value_ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
        (Value::List(a), Value::List(b)) | (Value::Set(a), Value::Set(b)) => {
            sequence_ordering(a, b)
        }
        _ => None,
    }
}

fn sequence_ordering(left: &[Value], right: &[Value]) -> Option<Ordering> {
    for (a, b) in left.iter().zip(right) {
        match value_ordering(a, b)? {
            Ordering::Equal => {}
            unequal => return Some(unequal),
        }
    }
    Some(left.len().cmp(&right.len()))
}

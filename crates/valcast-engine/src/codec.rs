//! JSON codec
//!
//! Default [`Codec`] implementation backing instance serialization.
//! Structural values map onto JSON directly; bytes serialize as arrays of
//! integers, sets as arrays, and records as objects. Decoded objects come
//! back as untagged records so they re-enter the coercion pipeline as
//! keyword mappings.

use valcast_schema::{Codec, HandlerError};
use valcast_value::{Record, Value};

/// Serde-JSON-backed codec
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<String, HandlerError> {
        let json = value_to_json(value)?;
        serde_json::to_string(&json).map_err(|error| HandlerError(error.to_string()))
    }

    fn decode(&self, text: &str) -> Result<Value, HandlerError> {
        let json: serde_json::Value =
            serde_json::from_str(text).map_err(|error| HandlerError(error.to_string()))?;
        Ok(json_to_value(json))
    }
}

fn value_to_json(value: &Value) -> Result<serde_json::Value, HandlerError> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| HandlerError(format!("float {f} has no JSON representation")))?,
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(bytes) => serde_json::Value::Array(
            bytes
                .iter()
                .map(|byte| serde_json::Value::Number((*byte).into()))
                .collect(),
        ),
        Value::List(items) | Value::Set(items) => serde_json::Value::Array(
            items
                .iter()
                .map(value_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Map(entries) => {
            let mut object = serde_json::Map::with_capacity(entries.len());
            for (key, entry) in entries {
                let Value::Str(name) = key else {
                    return Err(HandlerError(format!(
                        "map key of type {} has no JSON representation",
                        key.type_name()
                    )));
                };
                object.insert(name.clone(), value_to_json(entry)?);
            }
            serde_json::Value::Object(object)
        }
        Value::Record(record) => {
            let mut object = serde_json::Map::with_capacity(record.len());
            for (name, entry) in record.iter() {
                object.insert(name.to_string(), value_to_json(entry)?);
            }
            serde_json::Value::Object(object)
        }
    })
}

fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(number) => match number.as_i64() {
            Some(i) => Value::Int(i),
            // Non-integral or out-of-range numbers decode as floats.
            None => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Str(s),
        serde_json::Value::Array(items) => {
            Value::List(items.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(object) => {
            let mut record = Record::new();
            for (name, entry) in object {
                record.insert(name, json_to_value(entry));
            }
            Value::Record(record)
        }
    }
}

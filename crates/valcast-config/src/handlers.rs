//! Config-flavored conversion handlers
//!
//! Environment entries are always strings, so config schemas want a more
//! forgiving bool conversion than the engine default: "y", "yes", "1",
//! and "true" (any casing) are truthy, anything else is falsy.

use valcast_schema::{HandlerResult, SchemaBuilder, TypeDecl};
use valcast_value::{Record, Value};

/// Lenient string-to-bool conversion handler
///
/// Non-string values that already are bools pass through; everything
/// else goes through the truthy-token check of its display form.
pub fn lenient_bool(_record: &Record, value: &Value) -> HandlerResult {
    if let Value::Bool(_) = value {
        return Ok(value.clone());
    }
    let text = value.as_display_string().unwrap_or_default();
    let truthy = matches!(
        text.to_lowercase().as_str(),
        "y" | "yes" | "1" | "true"
    );
    Ok(Value::Bool(truthy))
}

/// Start a config schema with the lenient bool handler pre-registered
#[must_use]
pub fn config_schema(name: impl Into<String>) -> SchemaBuilder {
    valcast_schema::Schema::builder(name).type_handler(TypeDecl::Bool, lenient_bool)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(value: Value) -> Value {
        lenient_bool(&Record::new(), &value).unwrap()
    }

    #[test]
    fn test_truthy_tokens() {
        for token in ["y", "Y", "yes", "YES", "1", "true", "True"] {
            assert_eq!(run(Value::Str(token.into())), Value::Bool(true), "{token}");
        }
    }

    #[test]
    fn test_everything_else_is_falsy() {
        for token in ["n", "no", "0", "false", "off", ""] {
            assert_eq!(run(Value::Str(token.into())), Value::Bool(false), "{token}");
        }
    }

    #[test]
    fn test_bool_passthrough() {
        assert_eq!(run(Value::Bool(true)), Value::Bool(true));
        assert_eq!(run(Value::Bool(false)), Value::Bool(false));
    }

    #[test]
    fn test_int_one_is_truthy() {
        assert_eq!(run(Value::Int(1)), Value::Bool(true));
        assert_eq!(run(Value::Int(0)), Value::Bool(false));
    }
}

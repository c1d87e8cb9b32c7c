//! Numeric conversion helpers between value variants

use crate::value::Value;

/// Convert a value to a float, parsing strings and widening integers
///
/// # Errors
///
/// Returns an error if the value is not numeric and cannot be parsed.
pub fn value_to_f64(value: &Value, context: &str) -> crate::Result<f64> {
    match value {
        Value::Float(f) => Ok(*f),
        #[allow(clippy::cast_precision_loss)]
        Value::Int(i) => Ok(*i as f64),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|error| crate::Error::conversion(context, error.to_string())),
        other => Err(crate::Error::conversion(
            context,
            format!("cannot convert {} to float", other.type_name()),
        )),
    }
}

/// Convert a value to an integer
///
/// Floats convert only when they carry no fractional part; strings are
/// parsed.
///
/// # Errors
///
/// Returns an error if the conversion would lose information or the value
/// is not numeric.
pub fn value_to_i64(value: &Value, context: &str) -> crate::Result<i64> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Float(f) => {
            #[allow(clippy::cast_possible_truncation)]
            let truncated = *f as i64;
            #[allow(clippy::cast_precision_loss)]
            if (truncated as f64 - *f).abs() < f64::EPSILON {
                Ok(truncated)
            } else {
                Err(crate::Error::conversion(
                    context,
                    format!("float {f} has a fractional part"),
                ))
            }
        }
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|error| crate::Error::conversion(context, error.to_string())),
        other => Err(crate::Error::conversion(
            context,
            format!("cannot convert {} to int", other.type_name()),
        )),
    }
}

/// Convert a value to a boolean
///
/// Accepts booleans, the integers 0/1, and the strings "true"/"false".
///
/// # Errors
///
/// Returns an error for any other value.
pub fn value_to_bool(value: &Value, context: &str) -> crate::Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Int(0) => Ok(false),
        Value::Int(1) => Ok(true),
        Value::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(crate::Error::conversion(
                context,
                format!("cannot parse '{other}' as bool"),
            )),
        },
        other => Err(crate::Error::conversion(
            context,
            format!("cannot convert {} to bool", other.type_name()),
        )),
    }
}

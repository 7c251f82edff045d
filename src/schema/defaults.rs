use serde_json::{Number, Value};

use super::ConfigError;
use crate::config::{ColumnConfig, ColumnType};

/// Converts a column's `default` literal into a value
///
/// This is the seam between the schema compiler and the host's type system.
/// Implementations must reject `timestamp` and unsupported types, and any
/// literal that cannot be coerced to the declared type.
pub trait DefaultResolver: Send + Sync {
    fn resolve(
        &self,
        column: &ColumnConfig,
        column_type: &ColumnType,
        literal: &Value,
    ) -> Result<Value, ConfigError>;
}

/// Resolves defaults straight from their JSON literal
///
/// - `boolean`: `true`/`false`, or the strings `"true"`/`"false"`
/// - `long`: an integral number, or a decimal string
/// - `double`: a number, or a numeric string
/// - `string`: a string as-is, anything else as its JSON text
/// - `json`: a string is parsed as JSON text, anything else is used as-is
///
/// A `null` literal resolves to `null` for every supported type.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralResolver;

impl DefaultResolver for LiteralResolver {
    fn resolve(
        &self,
        column: &ColumnConfig,
        column_type: &ColumnType,
        literal: &Value,
    ) -> Result<Value, ConfigError> {
        match column_type {
            ColumnType::Timestamp => {
                return Err(ConfigError::timestamp_in_nested_path(&column.name));
            }
            ColumnType::Other(type_name) => {
                return Err(ConfigError::unsupported_type(type_name));
            }
            _ => {}
        }

        if literal.is_null() {
            return Ok(Value::Null);
        }

        let resolved = match column_type {
            ColumnType::Boolean => to_boolean(literal),
            ColumnType::Long => to_long(literal),
            ColumnType::Double => to_double(literal),
            ColumnType::String => Some(to_text(literal)),
            ColumnType::Json => to_json(literal),
            ColumnType::Timestamp | ColumnType::Other(_) => None,
        };

        resolved.ok_or_else(|| {
            ConfigError::invalid_default(
                &column.name,
                column_type.name(),
                format!("{} is not a valid {}", literal, column_type),
            )
        })
    }
}

fn to_boolean(literal: &Value) -> Option<Value> {
    match literal {
        Value::Bool(b) => Some(Value::Bool(*b)),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(Value::Bool(true)),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(Value::Bool(false)),
        _ => None,
    }
}

fn to_long(literal: &Value) -> Option<Value> {
    match literal {
        Value::Number(n) => n.as_i64().map(Value::from),
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn to_double(literal: &Value) -> Option<Value> {
    let f = match literal {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Number::from_f64(f).map(Value::Number)
}

fn to_text(literal: &Value) -> Value {
    match literal {
        Value::String(s) => Value::String(s.clone()),
        other => Value::String(other.to_string()),
    }
}

fn to_json(literal: &Value) -> Option<Value> {
    match literal {
        Value::String(text) => serde_json::from_str(text).ok(),
        other => Some(other.clone()),
    }
}

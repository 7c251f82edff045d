use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use super::ColumnType;
use crate::path::JsonPath;

/// One entry of `columns`, `add_columns` or `drop_columns`
///
/// Example:
/// ```json
/// {"name": "$.payload.k4", "src": "$.payload.k2"}
/// {"name": "$.payload.k3", "type": "json", "default": "{}"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ColumnConfig {
    /// Flat column name, or a nested path starting with `$.`
    #[validate(length(min = 1, message = "column name must not be empty"))]
    pub name: String,

    /// Declared type, used with `default`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<ColumnType>,

    /// Literal used when the source value is missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Path to copy the value from instead of `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

impl ColumnConfig {
    /// A bare entry with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: None,
            default: None,
            src: None,
        }
    }

    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = Some(column_type);
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    /// Whether this entry addresses a location inside a nested field
    pub fn is_nested(&self) -> bool {
        JsonPath::is_nested_name(&self.name)
    }
}

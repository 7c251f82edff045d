use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a column
///
/// Unrecognized type tags are kept as `Other` so the schema compiler can
/// reject them with the offending name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    Boolean,
    Long,
    Double,
    String,
    Json,
    Timestamp,
    Other(String),
}

impl ColumnType {
    /// Canonical tag used in configuration files
    pub fn name(&self) -> &str {
        match self {
            ColumnType::Boolean => "boolean",
            ColumnType::Long => "long",
            ColumnType::Double => "double",
            ColumnType::String => "string",
            ColumnType::Json => "json",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Other(name) => name,
        }
    }
}

impl From<&str> for ColumnType {
    fn from(tag: &str) -> Self {
        match tag {
            "boolean" => ColumnType::Boolean,
            "long" | "integer" => ColumnType::Long,
            "double" | "float" => ColumnType::Double,
            "string" => ColumnType::String,
            "json" => ColumnType::Json,
            "timestamp" => ColumnType::Timestamp,
            other => ColumnType::Other(other.to_string()),
        }
    }
}

impl From<String> for ColumnType {
    fn from(tag: String) -> Self {
        ColumnType::from(tag.as_str())
    }
}

impl From<ColumnType> for String {
    fn from(column_type: ColumnType) -> Self {
        column_type.name().to_string()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

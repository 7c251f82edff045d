use thiserror::Error;

use crate::path::PathError;

/// Errors raised while loading or compiling a filter configuration
///
/// Every variant is a configuration-time failure. Once a schema compiles,
/// visiting values with it cannot fail.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A nested path is malformed
    #[error(transparent)]
    Path(#[from] PathError),

    /// A keep or add target (or its `src`) ends in `[*]`
    #[error("Column '{path}': a path ending with '[*]' cannot be a column definition")]
    WildcardTarget { path: String },

    /// `type: timestamp` was declared on a nested path
    #[error("Column '{path}': type: timestamp is not available in json path")]
    TimestampInNestedPath { path: String },

    /// The declared type is outside the supported set
    #[error("type: '{type_name}' is not supported")]
    UnsupportedType { type_name: String },

    /// An add entry has neither `src` nor `type` with `default`
    #[error("add_columns: Column '{path}' does not have \"src\", or \"type\" and \"default\"")]
    IncompleteAddColumn { path: String },

    /// The `default` literal cannot be converted to the declared type
    #[error("Column '{path}': default cannot be converted to {type_name}: {message}")]
    InvalidDefault {
        path: String,
        type_name: String,
        message: String,
    },

    /// Structural validation of the configuration failed
    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// The configuration is not valid JSON
    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be read
    #[error("Failed to read configuration file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub fn wildcard_target(path: impl Into<String>) -> Self {
        Self::WildcardTarget { path: path.into() }
    }

    pub fn timestamp_in_nested_path(path: impl Into<String>) -> Self {
        Self::TimestampInNestedPath { path: path.into() }
    }

    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    pub fn incomplete_add_column(path: impl Into<String>) -> Self {
        Self::IncompleteAddColumn { path: path.into() }
    }

    pub fn invalid_default(
        path: impl Into<String>,
        type_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidDefault {
            path: path.into(),
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

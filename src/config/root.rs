use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use validator::Validate;

use super::ColumnConfig;
use crate::schema::{CompiledSchema, ConfigError, LiteralResolver};

/// Top-level configuration of the column filter
///
/// `drop_columns` wins over `columns`: when any drop entry is configured the
/// keep list is ignored. `add_columns` applies in both modes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct FilterConfig {
    /// Columns to keep, in output order (allow-list)
    #[serde(default)]
    #[validate(nested)]
    pub columns: Vec<ColumnConfig>,

    /// Columns appended after the kept ones
    #[serde(default)]
    #[validate(nested)]
    pub add_columns: Vec<ColumnConfig>,

    /// Columns to remove
    #[serde(default)]
    #[validate(nested)]
    pub drop_columns: Vec<ColumnConfig>,
}

impl FilterConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: FilterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Compile the nested-path entries into a schema
    pub fn compile(&self) -> Result<CompiledSchema, ConfigError> {
        self.validate()?;
        CompiledSchema::compile_with(
            &LiteralResolver,
            &self.columns,
            &self.add_columns,
            &self.drop_columns,
        )
    }
}

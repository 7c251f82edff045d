use serde_json::Value;

use super::{ConfigError, DefaultResolver};
use crate::config::{ColumnConfig, ColumnType};
use crate::path::{JsonPath, Segment};

/// Which list a column entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// `columns`: a bare entry keeps (and descends into) the source value
    Keep,
    /// `add_columns`: the entry must say where its value comes from
    Add,
}

/// A compiled keep or add column on a nested path
///
/// The value written at `path` comes from the sibling named by
/// [`src_base_key`](Self::src_base_key), falling back to `default_value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    path: JsonPath,
    base_key: Segment,
    column_type: Option<ColumnType>,
    default_value: Option<Value>,
    src: Option<JsonPath>,
    src_base_key: Segment,
}

impl Directive {
    /// Keep whatever sits at `path`
    pub fn keep(path: JsonPath) -> Result<Self, ConfigError> {
        Self::build(path, None, None, None)
    }

    /// Write `default_value` at `path` when nothing is there
    pub fn with_default(
        path: JsonPath,
        column_type: ColumnType,
        default_value: Value,
    ) -> Result<Self, ConfigError> {
        Self::build(path, Some(column_type), Some(default_value), None)
    }

    /// Copy the sibling named by `src` to `path`
    pub fn alias(path: JsonPath, src: JsonPath) -> Result<Self, ConfigError> {
        Self::build(path, None, None, Some(src))
    }

    /// Compile one configured column entry
    ///
    /// `src` takes precedence over `type` + `default`. An entry with neither
    /// is a plain keep, which only `columns` allows. `timestamp` and unknown
    /// types are rejected even without a `default`.
    pub fn from_column(
        column: &ColumnConfig,
        role: ColumnRole,
        resolver: &dyn DefaultResolver,
    ) -> Result<Self, ConfigError> {
        let path = JsonPath::parse(&column.name)?;

        if let Some(src) = &column.src {
            return Self::alias(path, JsonPath::parse(src)?);
        }

        match (&column.column_type, &column.default) {
            (Some(column_type), Some(literal)) => {
                let default_value = resolver.resolve(column, column_type, literal)?;
                Self::with_default(path, column_type.clone(), default_value)
            }
            _ if role == ColumnRole::Add => Err(ConfigError::incomplete_add_column(&column.name)),
            // rejected with or without a default
            (Some(ColumnType::Timestamp), None) => {
                Err(ConfigError::timestamp_in_nested_path(&column.name))
            }
            (Some(ColumnType::Other(type_name)), None) => {
                Err(ConfigError::unsupported_type(type_name))
            }
            (column_type, _) => Self::build(path, column_type.clone(), None, None),
        }
    }

    fn build(
        path: JsonPath,
        column_type: Option<ColumnType>,
        default_value: Option<Value>,
        src: Option<JsonPath>,
    ) -> Result<Self, ConfigError> {
        if path.ends_with_wildcard() {
            return Err(ConfigError::wildcard_target(path.to_string()));
        }
        let base_key = path.last_segment()?.clone();

        let src_base_key = match &src {
            Some(src) if src.ends_with_wildcard() => {
                return Err(ConfigError::wildcard_target(src.to_string()));
            }
            Some(src) => src.last_segment()?.clone(),
            None => base_key.clone(),
        };

        Ok(Self {
            path,
            base_key,
            column_type,
            default_value,
            src,
            src_base_key,
        })
    }

    /// Where the result is written
    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    /// Key (or index) of `path` inside its parent
    pub fn base_key(&self) -> &Segment {
        &self.base_key
    }

    pub fn column_type(&self) -> Option<&ColumnType> {
        self.column_type.as_ref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn src(&self) -> Option<&JsonPath> {
        self.src.as_ref()
    }

    /// Key (or index) the source value is read from: the last segment of
    /// `src` when aliased, otherwise [`base_key`](Self::base_key)
    pub fn src_base_key(&self) -> &Segment {
        &self.src_base_key
    }
}

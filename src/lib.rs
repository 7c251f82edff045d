/// reshape - nested column rewriting for record filters
///
/// This library rewrites the nested (map / array) fields of records:
/// keeping, renaming, copying, defaulting, adding and dropping members
/// addressed by paths such as `$.payload.items[0].sku`, while leaving every
/// unaddressed branch as it was.

pub mod config;
pub mod path;
pub mod schema;
pub mod visitor;

// Re-export commonly used types
pub use config::{ColumnConfig, ColumnType, FilterConfig};
pub use path::{JsonPath, PathError, Segment};
pub use schema::{CompiledSchema, ConfigError, DefaultResolver, Directive, LiteralResolver};
pub use visitor::Visitor;

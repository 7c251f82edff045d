/// Configuration types for the column filter
///
/// This module contains the serde types for the filter's JSON
/// configuration: the keep / add / drop column lists and their entries.

mod column;
mod root;
mod types;

pub use column::ColumnConfig;
pub use root::FilterConfig;
pub use types::ColumnType;

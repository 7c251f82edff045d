/// Schema compiler for nested columns
///
/// Turns the configured keep / add / drop column lists into the lookup
/// tables the visitor reads: a set of paths worth descending into, and the
/// per-parent keep, add and drop tables.

mod compiler;
mod defaults;
mod directive;
mod error;

pub use compiler::{CompiledSchema, DirectiveTable, DropTable};
pub use defaults::{DefaultResolver, LiteralResolver};
pub use directive::{ColumnRole, Directive};
pub use error::ConfigError;

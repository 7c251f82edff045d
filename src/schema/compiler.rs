use indexmap::IndexMap;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

use super::{ColumnRole, ConfigError, DefaultResolver, Directive, LiteralResolver};
use crate::config::ColumnConfig;
use crate::path::JsonPath;
use crate::visitor::Visitor;

/// Directives grouped by the path of the value they live in, in configured
/// order
pub type DirectiveTable = HashMap<JsonPath, IndexMap<JsonPath, Directive>>;

/// Dropped paths grouped by the path of the value they live in
pub type DropTable = HashMap<JsonPath, HashSet<JsonPath>>;

/// The nested-path columns of a filter configuration, compiled for visiting
///
/// Built once by [`CompiledSchema::compile`] and read-only afterwards, so a
/// single instance can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct CompiledSchema {
    /// Every prefix of every configured path; nothing else is descended into
    should_visit: HashSet<JsonPath>,
    keep_columns: DirectiveTable,
    add_columns: DirectiveTable,
    drop_columns: DropTable,
}

impl CompiledSchema {
    /// Compile with [`LiteralResolver`] for `default` literals
    pub fn compile(
        columns: &[ColumnConfig],
        add_columns: &[ColumnConfig],
        drop_columns: &[ColumnConfig],
    ) -> Result<Self, ConfigError> {
        Self::compile_with(&LiteralResolver, columns, add_columns, drop_columns)
    }

    /// Compile the keep, add and drop lists
    ///
    /// Entries whose name is not a nested path (`$.` prefix) are flat
    /// columns and are skipped. When `drop_columns` is non-empty, `columns`
    /// only contributes to the visit set and builds no keep table.
    pub fn compile_with(
        resolver: &dyn DefaultResolver,
        columns: &[ColumnConfig],
        add_columns: &[ColumnConfig],
        drop_columns: &[ColumnConfig],
    ) -> Result<Self, ConfigError> {
        let mut builder = SchemaBuilder::default();

        for column in columns.iter().chain(add_columns).chain(drop_columns) {
            builder.should_visit_put(column)?;
        }

        if !drop_columns.is_empty() {
            if columns.iter().any(ColumnConfig::is_nested) {
                debug!("drop_columns is configured, ignoring nested paths in columns");
            }
            for column in drop_columns.iter().filter(|c| c.is_nested()) {
                builder.drop_columns_put(JsonPath::parse(&column.name)?)?;
            }
        } else {
            for column in columns.iter().filter(|c| c.is_nested()) {
                let directive = Directive::from_column(column, ColumnRole::Keep, resolver)?;
                builder.keep_columns_put(directive)?;
            }
        }

        // Added columns always go last. Use `columns` to place them elsewhere.
        for column in add_columns.iter().filter(|c| c.is_nested()) {
            let directive = Directive::from_column(column, ColumnRole::Add, resolver)?;
            builder.add_columns_put(directive)?;
        }

        Ok(builder.finish())
    }

    /// Whether the visitor may descend into `path`
    pub fn should_visit(&self, path: &JsonPath) -> bool {
        self.should_visit.contains(path)
    }

    /// Keep directives for the children of `parent`
    pub fn keep_columns(&self, parent: &JsonPath) -> Option<&IndexMap<JsonPath, Directive>> {
        self.keep_columns.get(parent)
    }

    /// Add directives for the children of `parent`
    pub fn add_columns(&self, parent: &JsonPath) -> Option<&IndexMap<JsonPath, Directive>> {
        self.add_columns.get(parent)
    }

    /// Dropped children of `parent`
    pub fn drop_columns(&self, parent: &JsonPath) -> Option<&HashSet<JsonPath>> {
        self.drop_columns.get(parent)
    }

    pub fn has_keep_columns(&self) -> bool {
        !self.keep_columns.is_empty()
    }

    pub fn has_add_columns(&self) -> bool {
        !self.add_columns.is_empty()
    }

    pub fn has_drop_columns(&self) -> bool {
        !self.drop_columns.is_empty()
    }

    /// Number of paths the visitor may descend into
    pub fn visit_path_count(&self) -> usize {
        self.should_visit.len()
    }

    /// A visitor reading this schema
    pub fn visitor(&self) -> Visitor<'_> {
        Visitor::new(self)
    }

    /// Rewrite `value`, found at `path`; see [`Visitor::visit`]
    pub fn visit<'v>(&self, path: &JsonPath, value: &'v Value) -> Cow<'v, Value> {
        self.visitor().visit(path, value)
    }
}

/// Mutable tables filled while compiling
#[derive(Default)]
struct SchemaBuilder {
    should_visit: HashSet<JsonPath>,
    keep_columns: DirectiveTable,
    add_columns: DirectiveTable,
    drop_columns: DropTable,
}

impl SchemaBuilder {
    /// Add every prefix of a nested column name, brackets included
    fn should_visit_put(&mut self, column: &ColumnConfig) -> Result<(), ConfigError> {
        if !column.is_nested() {
            return Ok(());
        }
        let path = JsonPath::parse(&column.name)?;
        self.should_visit.extend(path.prefixes());
        Ok(())
    }

    fn keep_columns_put(&mut self, directive: Directive) -> Result<(), ConfigError> {
        let parent = directive.path().parent()?;
        trace!(path = %directive.path(), parent = %parent, "keep column");
        self.keep_columns
            .entry(parent)
            .or_default()
            .insert(directive.path().clone(), directive);
        Ok(())
    }

    fn add_columns_put(&mut self, directive: Directive) -> Result<(), ConfigError> {
        let parent = directive.path().parent()?;
        trace!(path = %directive.path(), parent = %parent, "add column");
        self.add_columns
            .entry(parent)
            .or_default()
            .insert(directive.path().clone(), directive);
        Ok(())
    }

    fn drop_columns_put(&mut self, path: JsonPath) -> Result<(), ConfigError> {
        let parent = path.parent()?;
        trace!(path = %path, parent = %parent, "drop column");
        self.drop_columns.entry(parent).or_default().insert(path);
        Ok(())
    }

    fn finish(self) -> CompiledSchema {
        debug!(
            visit_paths = self.should_visit.len(),
            keep_parents = self.keep_columns.len(),
            add_parents = self.add_columns.len(),
            drop_parents = self.drop_columns.len(),
            "compiled nested column schema"
        );
        CompiledSchema {
            should_visit: self.should_visit,
            keep_columns: self.keep_columns,
            add_columns: self.add_columns,
            drop_columns: self.drop_columns,
        }
    }
}

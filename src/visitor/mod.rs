//! Selective visitor over nested values
//!
//! This module contains the rewrite algorithm that applies a
//! [`CompiledSchema`] to one nested field of a record.

use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::trace;

use crate::path::JsonPath;
use crate::schema::{CompiledSchema, Directive};

/// Applies a compiled schema to nested values
///
/// The visitor only descends into paths the schema names, so the cost of a
/// visit follows the configured columns rather than the size of the value.
/// Branches it does not descend into are returned as borrowed input.
///
/// Recursion follows the nesting of the input value and no depth limit is
/// enforced; callers feeding untrusted, arbitrarily deep documents should
/// bound nesting when they parse them.
#[derive(Debug, Clone, Copy)]
pub struct Visitor<'a> {
    /// Compiled keep / add / drop tables
    pub schema: &'a CompiledSchema,
}

impl<'a> Visitor<'a> {
    /// Create a new visitor reading a compiled schema
    pub fn new(schema: &'a CompiledSchema) -> Self {
        Self { schema }
    }

    /// Rewrite a value found at `path`
    ///
    /// Maps and arrays on a configured path are rebuilt; everything else is
    /// returned untouched. A rebuilt parent owns its children, so untouched
    /// siblings inside it are cloned. Use [`rewrite`](Self::rewrite) when the
    /// value can be given up, to move them instead.
    ///
    /// # Arguments
    /// * `path` - Where `value` sits, e.g. `$.payload` for a record field
    /// * `value` - The value to rewrite; never modified
    ///
    /// # Returns
    /// `Cow::Borrowed(value)` when nothing under `path` is configured,
    /// otherwise the rebuilt value
    ///
    /// # Example
    /// ```
    /// use reshape::config::ColumnConfig;
    /// use reshape::path::JsonPath;
    /// use reshape::schema::CompiledSchema;
    /// use serde_json::json;
    ///
    /// let schema =
    ///     CompiledSchema::compile(&[], &[], &[ColumnConfig::new("$.payload.secret")]).unwrap();
    /// let value = json!({"id": 1, "secret": "x"});
    ///
    /// let visited = schema.visitor().visit(&JsonPath::field("payload"), &value);
    /// assert_eq!(visited.into_owned(), json!({"id": 1}));
    /// ```
    pub fn visit<'v>(&self, path: &JsonPath, value: &'v Value) -> Cow<'v, Value> {
        if !self.schema.should_visit(path) {
            trace!(path = %path, "not configured, passing through");
            return Cow::Borrowed(value);
        }
        match value {
            Value::Array(items) => Cow::Owned(self.visit_array(path, items)),
            Value::Object(map) => Cow::Owned(self.visit_map(path, map)),
            _ => Cow::Borrowed(value),
        }
    }

    /// Rewrite a top-level record field, anchored at `$.<name>`
    pub fn visit_field<'v>(&self, name: &str, value: &'v Value) -> Cow<'v, Value> {
        self.visit(&JsonPath::field(name), value)
    }

    /// Owned variant of [`visit`](Self::visit)
    ///
    /// Untouched values, including untouched siblings of rebuilt branches,
    /// are moved through without copying. Only values read by more than one
    /// directive, and values copied by an add column, are cloned.
    pub fn rewrite(&self, path: &JsonPath, value: Value) -> Value {
        if !self.schema.should_visit(path) {
            return value;
        }
        match value {
            Value::Array(items) => self.rewrite_array(path, items),
            Value::Object(map) => self.rewrite_map(path, map),
            other => other,
        }
    }

    /// Rewrite every field of a record in place of the original
    ///
    /// Field order is kept; scalar fields pass through.
    pub fn rewrite_record(&self, record: Map<String, Value>) -> Map<String, Value> {
        record
            .into_iter()
            .map(|(name, value)| {
                let path = JsonPath::field(&name);
                let value = self.rewrite(&path, value);
                (name, value)
            })
            .collect()
    }

    fn visit_array(&self, path: &JsonPath, items: &[Value]) -> Value {
        let mut result = Vec::with_capacity(items.len());
        let wildcard = path.wildcard();

        if let Some(dropped) = self.schema.drop_columns(path) {
            let drops_all = dropped.contains(&wildcard);
            for (i, item) in items.iter().enumerate() {
                let exact = path.index(i);
                if drops_all || dropped.contains(&exact) {
                    continue;
                }
                let element_path = self.element_path(exact, &wildcard);
                result.push(self.visit(&element_path, item).into_owned());
            }
        } else if let Some(kept) = self.schema.keep_columns(path) {
            // Output order and length follow the directives, not the input.
            for directive in kept.values() {
                let found = directive
                    .src_base_key()
                    .as_index()
                    .and_then(|i| items.get(i));
                result.push(self.resolve(directive, found));
            }
        } else {
            for (i, item) in items.iter().enumerate() {
                let element_path = self.element_path(path.index(i), &wildcard);
                result.push(self.visit(&element_path, item).into_owned());
            }
        }

        // Added elements are appended; the index in their path is ignored.
        if let Some(added) = self.schema.add_columns(path) {
            for directive in added.values() {
                let found = directive
                    .src_base_key()
                    .as_index()
                    .and_then(|i| items.get(i));
                result.push(self.resolve(directive, found));
            }
        }

        Value::Array(result)
    }

    fn visit_map(&self, path: &JsonPath, map: &Map<String, Value>) -> Value {
        let mut result = Map::new();

        if let Some(dropped) = self.schema.drop_columns(path) {
            for (key, value) in map {
                let child = path.key(key);
                if !dropped.contains(&child) {
                    result.insert(key.clone(), self.visit(&child, value).into_owned());
                }
            }
        } else if let Some(kept) = self.schema.keep_columns(path) {
            // Keys without a directive are removed.
            for directive in kept.values() {
                let found = map.get(&directive.src_base_key().to_key());
                result.insert(directive.base_key().to_key(), self.resolve(directive, found));
            }
        } else {
            for (key, value) in map {
                let child = path.key(key);
                result.insert(key.clone(), self.visit(&child, value).into_owned());
            }
        }

        if let Some(added) = self.schema.add_columns(path) {
            for directive in added.values() {
                let found = map.get(&directive.src_base_key().to_key());
                let value = self.resolve(directive, found);
                let key = directive.base_key().to_key();
                // an added key always lands at the end, even if it was kept
                result.shift_remove(&key);
                result.insert(key, value);
            }
        }

        Value::Object(result)
    }

    fn rewrite_array(&self, path: &JsonPath, items: Vec<Value>) -> Value {
        // Added elements read the input, so resolve them before it is consumed.
        let added: Vec<Value> = match self.schema.add_columns(path) {
            Some(added) => added
                .values()
                .map(|directive| {
                    let found = directive
                        .src_base_key()
                        .as_index()
                        .and_then(|i| items.get(i));
                    self.resolve(directive, found)
                })
                .collect(),
            None => Vec::new(),
        };
        let mut result = Vec::with_capacity(items.len() + added.len());
        let wildcard = path.wildcard();

        if let Some(dropped) = self.schema.drop_columns(path) {
            let drops_all = dropped.contains(&wildcard);
            for (i, item) in items.into_iter().enumerate() {
                let exact = path.index(i);
                if drops_all || dropped.contains(&exact) {
                    continue;
                }
                let element_path = self.element_path(exact, &wildcard);
                result.push(self.rewrite(&element_path, item));
            }
        } else if let Some(kept) = self.schema.keep_columns(path) {
            let last_reads = last_reads(kept.values().map(|d| d.src_base_key().as_index()));
            let mut sources: Vec<Option<Value>> = items.into_iter().map(Some).collect();
            for (position, directive) in kept.values().enumerate() {
                let found = directive.src_base_key().as_index().and_then(|i| {
                    if last_reads.get(&i) == Some(&position) {
                        sources.get_mut(i)?.take()
                    } else {
                        sources.get(i)?.clone()
                    }
                });
                result.push(self.resolve_owned(directive, found));
            }
        } else {
            for (i, item) in items.into_iter().enumerate() {
                let element_path = self.element_path(path.index(i), &wildcard);
                result.push(self.rewrite(&element_path, item));
            }
        }

        result.extend(added);
        Value::Array(result)
    }

    fn rewrite_map(&self, path: &JsonPath, mut map: Map<String, Value>) -> Value {
        let added: Vec<(String, Value)> = match self.schema.add_columns(path) {
            Some(added) => added
                .values()
                .map(|directive| {
                    let found = map.get(&directive.src_base_key().to_key());
                    (directive.base_key().to_key(), self.resolve(directive, found))
                })
                .collect(),
            None => Vec::new(),
        };
        let mut result = Map::new();

        if let Some(dropped) = self.schema.drop_columns(path) {
            for (key, value) in map {
                let child = path.key(&key);
                if !dropped.contains(&child) {
                    let value = self.rewrite(&child, value);
                    result.insert(key, value);
                }
            }
        } else if let Some(kept) = self.schema.keep_columns(path) {
            let last_reads =
                last_reads(kept.values().map(|d| Some(d.src_base_key().to_key())));
            for (position, directive) in kept.values().enumerate() {
                let key = directive.src_base_key().to_key();
                let found = if last_reads.get(&key) == Some(&position) {
                    map.swap_remove(&key)
                } else {
                    map.get(&key).cloned()
                };
                result.insert(directive.base_key().to_key(), self.resolve_owned(directive, found));
            }
        } else {
            for (key, value) in map {
                let child = path.key(&key);
                let value = self.rewrite(&child, value);
                result.insert(key, value);
            }
        }

        for (key, value) in added {
            result.shift_remove(&key);
            result.insert(key, value);
        }

        Value::Object(result)
    }

    /// Path an array element is visited at: `path[i]` when configured,
    /// `path[*]` otherwise
    fn element_path(&self, exact: JsonPath, wildcard: &JsonPath) -> JsonPath {
        if self.schema.should_visit(&exact) {
            exact
        } else {
            wildcard.clone()
        }
    }

    /// Visit the source value of a directive, or its default when the
    /// source is missing. Without either the result is `null`.
    fn resolve(&self, directive: &Directive, found: Option<&Value>) -> Value {
        match found.or(directive.default_value()) {
            Some(value) => self.visit(directive.path(), value).into_owned(),
            None => Value::Null,
        }
    }

    /// [`resolve`](Self::resolve) for a source value the caller owns
    fn resolve_owned(&self, directive: &Directive, found: Option<Value>) -> Value {
        match found {
            Some(value) => self.rewrite(directive.path(), value),
            None => self.resolve(directive, None),
        }
    }
}

/// Position of the last directive reading each source key
///
/// That directive may take the source value; earlier readers clone it.
fn last_reads<K: Hash + Eq>(keys: impl Iterator<Item = Option<K>>) -> HashMap<K, usize> {
    let mut last = HashMap::new();
    for (position, key) in keys.enumerate() {
        if let Some(key) = key {
            last.insert(key, position);
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColumnConfig, ColumnType};
    use serde_json::json;

    /// {"k1":{"k1":"v"},"k2":{"k2":"v"}}
    fn nested_maps() -> Value {
        json!({"k1": {"k1": "v"}, "k2": {"k2": "v"}})
    }

    fn visit_json1(schema: &CompiledSchema, value: &Value) -> String {
        let visited = schema.visitor().visit_field("json1", value);
        serde_json::to_string(&visited).unwrap()
    }

    fn string_default(name: &str, default: &str) -> ColumnConfig {
        ColumnConfig::new(name)
            .with_type(ColumnType::String)
            .with_default(json!(default))
    }

    fn json_default(name: &str, default: &str) -> ColumnConfig {
        ColumnConfig::new(name)
            .with_type(ColumnType::Json)
            .with_default(json!(default))
    }

    #[test]
    fn test_visit_map_drop_columns() {
        let schema = CompiledSchema::compile(
            &[],
            &[],
            &[
                ColumnConfig::new("$.json1.k1.k1"),
                ColumnConfig::new("$.json1.k2"),
            ],
        )
        .unwrap();

        assert_eq!(visit_json1(&schema, &nested_maps()), r#"{"k1":{}}"#);
    }

    #[test]
    fn test_visit_map_add_columns() {
        let schema = CompiledSchema::compile(
            &[],
            &[
                json_default("$.json1.k3", "{}"),
                string_default("$.json1.k3.k3", "v"),
                ColumnConfig::new("$.json1.k4").with_src("$.json1.k2"),
            ],
            &[],
        )
        .unwrap();

        assert_eq!(
            visit_json1(&schema, &nested_maps()),
            r#"{"k1":{"k1":"v"},"k2":{"k2":"v"},"k3":{"k3":"v"},"k4":{"k2":"v"}}"#
        );
    }

    #[test]
    fn test_visit_map_columns() {
        let schema = CompiledSchema::compile(
            &[
                ColumnConfig::new("$.json1.k1"),
                // naming only a child of k2 does not keep k2 itself
                ColumnConfig::new("$.json1.k2.k2"),
                json_default("$.json1.k3", "{}"),
                string_default("$.json1.k3.k3", "v"),
                ColumnConfig::new("$.json1.k4").with_src("$.json1.k2"),
            ],
            &[],
            &[],
        )
        .unwrap();

        assert_eq!(
            visit_json1(&schema, &nested_maps()),
            r#"{"k1":{"k1":"v"},"k3":{"k3":"v"},"k4":{"k2":"v"}}"#
        );
    }

    #[test]
    fn test_visit_array_drop_columns() {
        let schema = CompiledSchema::compile(
            &[],
            &[],
            &[
                ColumnConfig::new("$.json1.k1[0].k1"),
                ColumnConfig::new("$.json1.k2[*]"),
            ],
        )
        .unwrap();
        let value = json!({"k1": [{"k1": "v"}], "k2": ["v", "v"]});

        assert_eq!(visit_json1(&schema, &value), r#"{"k1":[{}],"k2":[]}"#);
    }

    #[test]
    fn test_visit_array_add_columns() {
        let schema = CompiledSchema::compile(
            &[],
            &[
                ColumnConfig::new("$.json1.k1[1]").with_src("$.json1.k1[0]"),
                json_default("$.json1.k3", "[]"),
                json_default("$.json1.k3[0]", "{}"),
                string_default("$.json1.k3[0].k3", "v"),
            ],
            &[],
        )
        .unwrap();
        let value = json!({"k1": [{"k1": "v"}], "k2": ["v", "v"]});

        assert_eq!(
            visit_json1(&schema, &value),
            r#"{"k1":[{"k1":"v"},{"k1":"v"}],"k2":["v","v"],"k3":[{"k3":"v"}]}"#
        );
    }

    #[test]
    fn test_visit_array_columns() {
        let schema = CompiledSchema::compile(
            &[
                ColumnConfig::new("$.json1.k1"),
                ColumnConfig::new("$.json1.k1[1]").with_src("$.json1.k1[0]"),
                ColumnConfig::new("$.json1.k2[0]"),
                json_default("$.json1.k3", "[]"),
                json_default("$.json1.k3[0]", "{}"),
                string_default("$.json1.k3[0].k3", "v"),
            ],
            &[],
            &[],
        )
        .unwrap();
        let value = json!({"k1": [{"k1": "v"}, "v"], "k2": ["v", "v"]});

        assert_eq!(
            visit_json1(&schema, &value),
            r#"{"k1":[{"k1":"v"}],"k3":[{"k3":"v"}]}"#
        );
    }

    #[test]
    fn test_unconfigured_path_is_borrowed() {
        let schema =
            CompiledSchema::compile(&[], &[], &[ColumnConfig::new("$.json1.k2")]).unwrap();
        let value = nested_maps();

        let visited = schema.visitor().visit_field("json2", &value);
        assert!(matches!(visited, Cow::Borrowed(v) if std::ptr::eq(v, &value)));
    }

    #[test]
    fn test_scalar_is_borrowed() {
        let schema =
            CompiledSchema::compile(&[], &[], &[ColumnConfig::new("$.json1.k2")]).unwrap();
        let value = json!("plain");

        let visited = schema.visitor().visit_field("json1", &value);
        assert!(matches!(visited, Cow::Borrowed(_)));
        assert_eq!(visited.into_owned(), json!("plain"));
    }

    #[test]
    fn test_pass_through_keeps_order() {
        // only k9 is configured, and it is absent from the value
        let schema =
            CompiledSchema::compile(&[], &[], &[ColumnConfig::new("$.json1.a.k9")]).unwrap();
        let value = json!({"z": 1, "a": {"y": [1, 2], "b": null}, "m": [{"x": true}]});

        assert_eq!(
            visit_json1(&schema, &value),
            r#"{"z":1,"a":{"y":[1,2],"b":null},"m":[{"x":true}]}"#
        );
    }

    #[test]
    fn test_input_is_not_modified() {
        let schema =
            CompiledSchema::compile(&[], &[], &[ColumnConfig::new("$.json1.k1.k1")]).unwrap();
        let value = nested_maps();

        let _ = schema.visitor().visit_field("json1", &value);
        assert_eq!(value, nested_maps());
    }

    #[test]
    fn test_add_is_appended_regardless_of_index() {
        let schema = CompiledSchema::compile(
            &[],
            &[string_default("$.json1.list[5]", "added")],
            &[],
        )
        .unwrap();
        let value = json!({"list": ["a", "b"]});

        assert_eq!(visit_json1(&schema, &value), r#"{"list":["a","b","added"]}"#);
    }

    #[test]
    fn test_add_existing_key_moves_to_end() {
        let schema = CompiledSchema::compile(
            &[],
            &[ColumnConfig::new("$.json1.k1").with_src("$.json1.k2")],
            &[],
        )
        .unwrap();

        assert_eq!(
            visit_json1(&schema, &nested_maps()),
            r#"{"k2":{"k2":"v"},"k1":{"k2":"v"}}"#
        );
    }

    #[test]
    fn test_keep_missing_without_default_is_null() {
        let schema = CompiledSchema::compile(
            &[ColumnConfig::new("$.json1.k1"), ColumnConfig::new("$.json1.k9")],
            &[],
            &[],
        )
        .unwrap();

        assert_eq!(
            visit_json1(&schema, &nested_maps()),
            r#"{"k1":{"k1":"v"},"k9":null}"#
        );
    }

    #[test]
    fn test_keep_renames_and_reorders() {
        let schema = CompiledSchema::compile(
            &[
                ColumnConfig::new("$.json1.second").with_src("$.json1.k2"),
                ColumnConfig::new("$.json1.first").with_src("$.json1.k1"),
            ],
            &[],
            &[],
        )
        .unwrap();

        assert_eq!(
            visit_json1(&schema, &nested_maps()),
            r#"{"second":{"k2":"v"},"first":{"k1":"v"}}"#
        );
    }

    #[test]
    fn test_keep_default_used_only_when_missing() {
        let schema = CompiledSchema::compile(
            &[
                string_default("$.json1.k1", "fallback"),
                string_default("$.json1.k5", "fallback"),
            ],
            &[],
            &[],
        )
        .unwrap();

        assert_eq!(
            visit_json1(&schema, &nested_maps()),
            r#"{"k1":{"k1":"v"},"k5":"fallback"}"#
        );
    }

    #[test]
    fn test_keep_array_reorders_by_index() {
        let schema = CompiledSchema::compile(
            &[
                ColumnConfig::new("$.json1.list"),
                ColumnConfig::new("$.json1.list[2]"),
                ColumnConfig::new("$.json1.list[0]"),
                string_default("$.json1.list[7]", "pad"),
            ],
            &[],
            &[],
        )
        .unwrap();
        let value = json!({"list": ["a", "b", "c"]});

        assert_eq!(visit_json1(&schema, &value), r#"{"list":["c","a","pad"]}"#);
    }

    #[test]
    fn test_drop_exact_index_compacts() {
        let schema = CompiledSchema::compile(
            &[],
            &[],
            &[
                ColumnConfig::new("$.json1.list[0]"),
                ColumnConfig::new("$.json1.list[2]"),
            ],
        )
        .unwrap();
        let value = json!({"list": ["a", "b", "c", "d"]});

        assert_eq!(visit_json1(&schema, &value), r#"{"list":["b","d"]}"#);
    }

    #[test]
    fn test_wildcard_descends_into_every_element() {
        let schema =
            CompiledSchema::compile(&[], &[], &[ColumnConfig::new("$.json1.items[*].secret")])
                .unwrap();
        let value = json!({"items": [{"id": 1, "secret": "x"}, {"id": 2, "secret": "y"}]});

        assert_eq!(
            visit_json1(&schema, &value),
            r#"{"items":[{"id":1},{"id":2}]}"#
        );
    }

    #[test]
    fn test_exact_index_wins_over_wildcard() {
        let schema = CompiledSchema::compile(
            &[],
            &[],
            &[
                ColumnConfig::new("$.json1.items[*].a"),
                ColumnConfig::new("$.json1.items[1].b"),
            ],
        )
        .unwrap();
        let value = json!({"items": [{"a": 1, "b": 2}, {"a": 3, "b": 4}]});

        // element 1 is visited at items[1], so only b is dropped there
        assert_eq!(
            visit_json1(&schema, &value),
            r#"{"items":[{"b":2},{"a":3}]}"#
        );
    }

    #[test]
    fn test_type_mismatch_falls_back_to_default() {
        let schema = CompiledSchema::compile(
            &[],
            &[string_default("$.json1.k1[0]", "d")],
            &[],
        )
        .unwrap();

        // k1 is a map, so the index directive finds nothing and its default
        // is added under the key "0"
        assert_eq!(
            visit_json1(&schema, &nested_maps()),
            r#"{"k1":{"k1":"v","0":"d"},"k2":{"k2":"v"}}"#
        );
    }

    #[test]
    fn test_index_directive_reads_numeric_key_of_map() {
        let schema = CompiledSchema::compile(
            &[],
            &[ColumnConfig::new("$.json1.copy").with_src("$.json1[0]")],
            &[],
        )
        .unwrap();
        let value = json!({"0": "zero"});

        assert_eq!(
            visit_json1(&schema, &value),
            r#"{"0":"zero","copy":"zero"}"#
        );
    }

    #[test]
    fn test_rewrite_moves_untouched_value() {
        let schema =
            CompiledSchema::compile(&[], &[], &[ColumnConfig::new("$.json1.k2")]).unwrap();
        let visitor = schema.visitor();

        assert_eq!(
            visitor.rewrite(&JsonPath::field("json2"), nested_maps()),
            nested_maps()
        );
        assert_eq!(
            visitor.rewrite(&JsonPath::field("json1"), nested_maps()),
            json!({"k1": {"k1": "v"}})
        );
    }

    #[test]
    fn test_drop_and_add_on_same_parents() {
        let schema = CompiledSchema::compile(
            &[],
            &[
                string_default("$.json1.k3", "v"),
                ColumnConfig::new("$.json1.l[9]").with_src("$.json1.l[0]"),
            ],
            &[
                ColumnConfig::new("$.json1.k2"),
                ColumnConfig::new("$.json1.l[1]"),
            ],
        )
        .unwrap();
        let value = json!({"k1": 1, "k2": 2, "l": ["a", "b", "c"]});
        let expected = r#"{"k1":1,"l":["a","c","a"],"k3":"v"}"#;

        assert_eq!(visit_json1(&schema, &value), expected);

        let rewritten = schema.visitor().rewrite(&JsonPath::field("json1"), value);
        assert_eq!(serde_json::to_string(&rewritten).unwrap(), expected);
    }

    #[test]
    fn test_rewrite_matches_visit() {
        let schema = CompiledSchema::compile(
            &[
                ColumnConfig::new("$.json1.k1"),
                ColumnConfig::new("$.json1.k1[1]").with_src("$.json1.k1[0]"),
                ColumnConfig::new("$.json1.k1[2]").with_src("$.json1.k1[0]"),
                ColumnConfig::new("$.json1.k2"),
                ColumnConfig::new("$.json1.k4").with_src("$.json1.k2"),
                string_default("$.json1.k5", "d"),
            ],
            &[ColumnConfig::new("$.json1.k1[5]").with_src("$.json1.k1[0]")],
            &[],
        )
        .unwrap();
        let value = json!({"k1": [{"k1": "v"}, "w"], "k2": {"k2": "v"}, "k3": 3});

        let visited = visit_json1(&schema, &value);
        assert_eq!(
            visited,
            r#"{"k1":[{"k1":"v"},{"k1":"v"},{"k1":"v"}],"k2":{"k2":"v"},"k4":{"k2":"v"},"k5":"d"}"#
        );

        let rewritten = schema.visitor().rewrite(&JsonPath::field("json1"), value);
        assert_eq!(serde_json::to_string(&rewritten).unwrap(), visited);
    }

    #[test]
    fn test_rewrite_moves_untouched_siblings() {
        let schema =
            CompiledSchema::compile(&[], &[], &[ColumnConfig::new("$.json1.small")]).unwrap();
        let big: Vec<Value> = (0..1000).map(|i| json!({"i": i})).collect();
        let value = json!({"small": 1, "big": big});
        let big_ptr = value["big"].as_array().unwrap().as_ptr();

        let rewritten = schema.visitor().rewrite(&JsonPath::field("json1"), value);

        assert!(rewritten.get("small").is_none());
        let big = rewritten["big"].as_array().unwrap();
        assert_eq!(big.len(), 1000);
        assert_eq!(big.as_ptr(), big_ptr);
    }

    #[test]
    fn test_rewrite_moves_untouched_array_elements() {
        let schema =
            CompiledSchema::compile(&[], &[], &[ColumnConfig::new("$.json1.list[0]")]).unwrap();
        let value = json!({"list": ["gone", {"inner": [1, 2, 3]}]});
        let inner_ptr = value["list"][1]["inner"].as_array().unwrap().as_ptr();

        let rewritten = schema.visitor().rewrite(&JsonPath::field("json1"), value);

        assert_eq!(rewritten, json!({"list": [{"inner": [1, 2, 3]}]}));
        assert_eq!(
            rewritten["list"][0]["inner"].as_array().unwrap().as_ptr(),
            inner_ptr
        );
    }

    #[test]
    fn test_rewrite_keep_moves_last_reader() {
        let schema = CompiledSchema::compile(
            &[
                ColumnConfig::new("$.json1.big"),
                ColumnConfig::new("$.json1.copy").with_src("$.json1.big"),
            ],
            &[],
            &[],
        )
        .unwrap();
        let value = json!({"other": 0, "big": {"inner": [1, 2, 3]}});
        let inner_ptr = value["big"]["inner"].as_array().unwrap().as_ptr();

        let rewritten = schema.visitor().rewrite(&JsonPath::field("json1"), value);

        assert_eq!(
            rewritten,
            json!({"big": {"inner": [1, 2, 3]}, "copy": {"inner": [1, 2, 3]}})
        );
        // the first reader gets a copy, the last one takes the original
        assert_ne!(rewritten["big"]["inner"].as_array().unwrap().as_ptr(), inner_ptr);
        assert_eq!(rewritten["copy"]["inner"].as_array().unwrap().as_ptr(), inner_ptr);
    }

    #[test]
    fn test_rewrite_record() {
        let schema =
            CompiledSchema::compile(&[], &[], &[ColumnConfig::new("$.json1.k2")]).unwrap();
        let record = json!({"id": 7, "json1": nested_maps(), "json2": nested_maps()});
        let Value::Object(record) = record else {
            unreachable!()
        };

        let rewritten = schema.visitor().rewrite_record(record);
        assert_eq!(
            serde_json::to_string(&rewritten).unwrap(),
            r#"{"id":7,"json1":{"k1":{"k1":"v"}},"json2":{"k1":{"k1":"v"},"k2":{"k2":"v"}}}"#
        );
    }

    #[test]
    fn test_shared_across_threads() {
        let schema =
            CompiledSchema::compile(&[], &[], &[ColumnConfig::new("$.json1.k2")]).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| visit_json1(&schema, &nested_maps())))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), r#"{"k1":{"k1":"v"}}"#);
            }
        });
    }
}

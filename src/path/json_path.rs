use std::fmt;
use std::str::FromStr;

use super::{PathError, Segment};

/// A parsed path into a nested value
///
/// The grammar is `"$" ("." name | "[" (index | "*") "]")*`. Names run up to
/// the next `.` or `[`, so they cannot contain either character.
///
/// # Example
/// ```
/// use reshape::path::{JsonPath, Segment};
///
/// let path: JsonPath = "$.json1.items[2].sku".parse().unwrap();
/// assert_eq!(path.parent().unwrap().to_string(), "$.json1.items[2]");
/// assert_eq!(path.last_segment().unwrap(), &Segment::Name("sku".into()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    /// The root path `$`
    pub fn root() -> Self {
        Self::default()
    }

    /// The path of a top-level record field, `$.<name>`
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Name(name.into())],
        }
    }

    /// Whether a column name is written in nested path notation
    ///
    /// Anything else is a flat column name and is not handled here.
    pub fn is_nested_name(name: &str) -> bool {
        name.starts_with("$.")
    }

    /// Parse a path string
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let mut rest = input
            .strip_prefix('$')
            .ok_or_else(|| PathError::missing_root(input))?;
        let mut segments = Vec::new();

        while !rest.is_empty() {
            let position = input.len() - rest.len();
            if let Some(after) = rest.strip_prefix('.') {
                let end = after.find(['.', '[']).unwrap_or(after.len());
                let name = &after[..end];
                if name.is_empty() {
                    return Err(PathError::empty_name(input));
                }
                segments.push(Segment::Name(name.to_string()));
                rest = &after[end..];
            } else if let Some(after) = rest.strip_prefix('[') {
                let end = after
                    .find(']')
                    .ok_or_else(|| PathError::unclosed_bracket(input))?;
                let inner = &after[..end];
                let segment = Segment::from_bracket(inner)
                    .ok_or_else(|| PathError::invalid_index(input, inner))?;
                segments.push(segment);
                rest = &after[end + 1..];
            } else {
                return Err(PathError::unexpected_character(input, position));
            }
        }

        Ok(Self { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments below the root
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The path with its last segment removed
    pub fn parent(&self) -> Result<JsonPath, PathError> {
        match self.segments.split_last() {
            Some((_, init)) => Ok(Self {
                segments: init.to_vec(),
            }),
            None => Err(PathError::RootHasNoParent),
        }
    }

    /// The last segment: a name, an index or the wildcard
    pub fn last_segment(&self) -> Result<&Segment, PathError> {
        self.segments.last().ok_or(PathError::RootHasNoParent)
    }

    pub fn ends_with_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard))
    }

    /// Extend this path by one segment
    pub fn child(&self, segment: Segment) -> JsonPath {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }

    /// `self.key`
    pub fn key(&self, name: &str) -> JsonPath {
        self.child(Segment::Name(name.to_string()))
    }

    /// `self[index]`
    pub fn index(&self, index: usize) -> JsonPath {
        self.child(Segment::Index(index))
    }

    /// `self[*]`
    pub fn wildcard(&self) -> JsonPath {
        self.child(Segment::Wildcard)
    }

    /// Every non-root prefix of this path, shortest first, ending with the
    /// path itself
    ///
    /// `$.a.b[1].c` yields `$.a`, `$.a.b`, `$.a.b[1]`, `$.a.b[1].c`.
    pub fn prefixes(&self) -> impl Iterator<Item = JsonPath> + '_ {
        (1..=self.segments.len()).map(|len| Self {
            segments: self.segments[..len].to_vec(),
        })
    }
}

impl FromStr for JsonPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

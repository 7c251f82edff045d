use std::fmt;

/// One step of a [`JsonPath`](super::JsonPath)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// `.name` - a map key
    Name(String),
    /// `[3]` - an array position
    Index(usize),
    /// `[*]` - any array position
    Wildcard,
}

impl Segment {
    /// Parse the text between `[` and `]`
    pub(crate) fn from_bracket(text: &str) -> Option<Self> {
        if text == "*" {
            return Some(Self::Wildcard);
        }
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        text.parse().ok().map(Self::Index)
    }

    /// The map key this segment names, if any
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }

    /// The array position this segment names, if any
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            _ => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }

    /// Text used when this segment becomes a key of a rebuilt map
    pub fn to_key(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Index(index) => index.to_string(),
            Self::Wildcard => "*".to_string(),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Name(name) => write!(f, ".{}", name),
            Segment::Index(index) => write!(f, "[{}]", index),
            Segment::Wildcard => write!(f, "[*]"),
        }
    }
}

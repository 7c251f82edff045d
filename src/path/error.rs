use thiserror::Error;

/// Errors produced while parsing or walking a path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path does not start with `$`
    #[error("Invalid path '{path}': must start with '$'")]
    MissingRoot { path: String },

    /// A `.` is not followed by a name
    #[error("Invalid path '{path}': empty name after '.'")]
    EmptyName { path: String },

    /// A `[` has no matching `]`
    #[error("Invalid path '{path}': unclosed '['")]
    UnclosedBracket { path: String },

    /// The text between brackets is neither an index nor `*`
    #[error("Invalid path '{path}': '[{segment}]' is not an array index or '[*]'")]
    InvalidIndex { path: String, segment: String },

    /// A segment starts with something other than `.` or `[`
    #[error("Invalid path '{path}': unexpected character at byte {position}")]
    UnexpectedCharacter { path: String, position: usize },

    /// `parent` or `last_segment` was asked of `$`
    #[error("The root path '$' has no parent")]
    RootHasNoParent,
}

impl PathError {
    pub fn missing_root(path: impl Into<String>) -> Self {
        Self::MissingRoot { path: path.into() }
    }

    pub fn empty_name(path: impl Into<String>) -> Self {
        Self::EmptyName { path: path.into() }
    }

    pub fn unclosed_bracket(path: impl Into<String>) -> Self {
        Self::UnclosedBracket { path: path.into() }
    }

    pub fn invalid_index(path: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::InvalidIndex {
            path: path.into(),
            segment: segment.into(),
        }
    }

    pub fn unexpected_character(path: impl Into<String>, position: usize) -> Self {
        Self::UnexpectedCharacter {
            path: path.into(),
            position,
        }
    }
}

use crate::base::TextRange;

/// A fatal error in declaration source. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("unrecognized character {text:?} at {range:?}")]
    InvalidToken { text: String, range: TextRange },

    #[error("expected {expected}, found `{found}` at {range:?}")]
    Unexpected {
        expected: &'static str,
        found: String,
        range: TextRange,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },

    #[error("conflicting accessibility modifiers at {range:?}")]
    ConflictingAccessibility { range: TextRange },

    #[error("duplicate modifier `{modifier}` at {range:?}")]
    DuplicateModifier {
        modifier: &'static str,
        range: TextRange,
    },

    #[error("{kind} declarations cannot have a base list at {range:?}")]
    UnexpectedBaseList { kind: &'static str, range: TextRange },
}

impl SyntaxError {
    /// Source range the error points at, when one exists.
    pub fn range(&self) -> Option<TextRange> {
        match self {
            SyntaxError::InvalidToken { range, .. }
            | SyntaxError::Unexpected { range, .. }
            | SyntaxError::ConflictingAccessibility { range }
            | SyntaxError::DuplicateModifier { range, .. }
            | SyntaxError::UnexpectedBaseList { range, .. } => Some(*range),
            SyntaxError::UnexpectedEof { .. } => None,
        }
    }
}

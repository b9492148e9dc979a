//! Error types for manifest handling

/// Errors while parsing manifest or introspection text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestError {
    /// Text did not follow the block grammar
    #[error("syntax error at byte {offset}: {message}")]
    Syntax {
        /// Byte offset of the offending token
        offset: usize,
        /// What was expected
        message: String,
    },

    /// String literal never closed
    #[error("unterminated string starting at byte {0}")]
    UnterminatedString(usize),

    /// `ensure` value other than present/absent
    #[error("invalid ensure value: '{0}'")]
    InvalidEnsure(String),

    /// No resource block found
    #[error("no resource block found")]
    Empty,
}

impl ManifestError {
    /// Create syntax error
    pub fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            offset,
            message: message.into(),
        }
    }
}

//! Error types for identity composition

/// Errors raised while resolving a resource identity
///
/// Each variant is fatal to the test case that produced it; none are retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// Title supplied more tokens than the schema has fields
    #[error("{resource_type}: title has {tokens} tokens but only {fields} identity fields exist")]
    TooManyTokens {
        /// Resource type being composed
        resource_type: String,
        /// Tokens found in the title
        tokens: usize,
        /// Canonical field count
        fields: usize,
    },

    /// Field found in neither the title nor the properties
    #[error("{resource_type}: identity field '{field}' missing from both title and properties")]
    MissingField {
        /// Resource type being composed
        resource_type: String,
        /// Canonical field name
        field: String,
    },

    /// Field value rejected by its kind
    #[error("invalid value '{value}' for identity field '{field}': {reason}")]
    InvalidValue {
        /// Canonical field name
        field: String,
        /// Offending value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// No schema registered for the resource type
    #[error("unknown resource type: '{0}'")]
    UnknownResourceType(String),
}

impl IdentityError {
    /// Create invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Name of the field involved, when the error concerns a single field
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field, .. } | Self::InvalidValue { field, .. } => Some(field),
            Self::TooManyTokens { .. } | Self::UnknownResourceType(_) => None,
        }
    }
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContextError>;

/// Errors raised while building a [`PatternContext`](crate::PatternContext).
///
/// Parsing itself never fails; only invalid configuration is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("note pool must not be empty")]
    EmptyNotePool,

    #[error("invalid note range {min}-{max}: min must not exceed max")]
    InvalidRange { min: i64, max: i64 },

    #[error("invalid variable name '{name}': use letters, digits and '_'")]
    InvalidVariableName { name: String },

    #[error("cannot read '{value}' as {expected}")]
    InvalidOption { value: String, expected: String },
}

impl ContextError {
    pub fn invalid_range(min: i64, max: i64) -> Self {
        ContextError::InvalidRange { min, max }
    }

    pub fn invalid_variable_name(name: impl Into<String>) -> Self {
        ContextError::InvalidVariableName { name: name.into() }
    }

    pub fn invalid_option(value: impl Into<String>, expected: impl Into<String>) -> Self {
        ContextError::InvalidOption {
            value: value.into(),
            expected: expected.into(),
        }
    }
}

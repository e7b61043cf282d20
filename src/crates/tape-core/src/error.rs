use thiserror::Error;

pub type Result<T> = std::result::Result<T, TapeError>;

/// Errors raised by tape helpers that have no sensible fail-soft reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TapeError {
    #[error("{op}: target length must be greater than zero")]
    ZeroLength { op: &'static str },

    #[error("{op}: pattern has no elements")]
    EmptyPattern { op: &'static str },

    #[error("{op}: {message}")]
    InvalidArgument { op: &'static str, message: String },
}

impl TapeError {
    pub fn zero_length(op: &'static str) -> Self {
        TapeError::ZeroLength { op }
    }

    pub fn empty_pattern(op: &'static str) -> Self {
        TapeError::EmptyPattern { op }
    }

    pub fn invalid_argument(op: &'static str, message: impl Into<String>) -> Self {
        TapeError::InvalidArgument {
            op,
            message: message.into(),
        }
    }
}

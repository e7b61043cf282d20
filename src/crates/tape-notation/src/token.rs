use serde::{Deserialize, Serialize};
use std::fmt;

/// Bounds accepted by `?<min-max>`; anything else falls back to `1..127`
pub const RANDOM_RANGE_LIMIT: u32 = 127;
pub const DEFAULT_RANDOM_RANGE: (u32, u32) = (1, 127);

/// One classified lexeme of tape notation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    /// `-` or `-*n`: `n` single-beat rests
    Rest(usize),
    /// An integer literal, kept as written
    Note(String),
    /// `[`
    GroupStart,
    /// `]`
    GroupEnd,
    /// `]*n`: close the group and play it `n` times
    GroupEndRepeat(usize),
    /// `?`: a value from the note pool
    Random,
    /// `?<min-max>`: an integer in `min..=max`
    RandomRange { min: u32, max: u32 },
    /// Anything else; dropped during expansion
    Unknown(String),
}

impl Token {
    pub fn is_group_delimiter(&self) -> bool {
        matches!(
            self,
            Token::GroupStart | Token::GroupEnd | Token::GroupEndRepeat(_)
        )
    }

    pub fn is_random(&self) -> bool {
        matches!(self, Token::Random | Token::RandomRange { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Token::Unknown(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Rest(1) => write!(f, "-"),
            Token::Rest(n) => write!(f, "-*{}", n),
            Token::Note(text) => write!(f, "{}", text),
            Token::GroupStart => write!(f, "["),
            Token::GroupEnd => write!(f, "]"),
            Token::GroupEndRepeat(n) => write!(f, "]*{}", n),
            Token::Random => write!(f, "?"),
            Token::RandomRange { min, max } => write!(f, "?<{}-{}>", min, max),
            Token::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_display() {
        assert_eq!(Token::Rest(1).to_string(), "-");
        assert_eq!(Token::Rest(3).to_string(), "-*3");
        assert_eq!(Token::GroupEndRepeat(2).to_string(), "]*2");
        assert_eq!(Token::RandomRange { min: 60, max: 72 }.to_string(), "?<60-72>");
        assert_eq!(Token::Unknown("foo".into()).to_string(), "foo");
    }

    #[test]
    fn test_token_predicates() {
        assert!(Token::GroupEndRepeat(2).is_group_delimiter());
        assert!(!Token::Note("1".into()).is_group_delimiter());
        assert!(Token::Random.is_random());
        assert!(Token::Unknown("x".into()).is_unknown());
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte offsets `start..end` of a lexeme in preprocessed pattern text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The lexeme this span points at in `text`
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexeme_span() {
        let span = Span::new(2, 6);
        assert_eq!(span.len(), 4);
        assert!(!span.is_empty());
        assert_eq!(span.to_string(), "2..6");
        assert!(Span::new(3, 3).is_empty());
    }

    #[test]
    fn test_span_slice() {
        let text = "1 [ 2 ]*3";
        assert_eq!(Span::new(6, 9).slice(text), "]*3");
        assert_eq!(Span::new(0, 1).slice(text), "1");
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rendering of a rest on the tape
pub const REST: &str = "-";

/// A single beat on a tape
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    /// Rest/silence
    Rest,
    /// Literal value (usually an integer, kept as written)
    Note(String),
}

impl Step {
    /// Check if this step is a rest
    pub fn is_rest(&self) -> bool {
        matches!(self, Step::Rest)
    }

    /// Try to extract the literal text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Step::Note(text) => Some(text),
            Step::Rest => None,
        }
    }

    /// Try to read the literal as an integer
    pub fn as_int(&self) -> Option<i64> {
        self.as_str().and_then(|text| text.parse().ok())
    }

    /// Map the integer value of a note, leaving rests and non-integer literals alone
    pub fn map_int(&self, f: impl FnOnce(i64) -> i64) -> Step {
        match self.as_int() {
            Some(n) => Step::from(f(n)),
            None => self.clone(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Note(text) if !text.is_empty() => write!(f, "{}", text),
            _ => write!(f, "{}", REST),
        }
    }
}

impl From<i64> for Step {
    fn from(n: i64) -> Self {
        Step::Note(n.to_string())
    }
}

impl From<String> for Step {
    fn from(s: String) -> Self {
        if s.is_empty() || s == REST {
            Step::Rest
        } else {
            Step::Note(s)
        }
    }
}

impl From<&str> for Step {
    fn from(s: &str) -> Self {
        Step::from(s.to_string())
    }
}

/// An expanded, flat sequence of steps: the interchange format
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tape {
    pub steps: Vec<Step>,
}

impl Tape {
    pub fn new(steps: Vec<Step>) -> Self {
        Tape { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// Number of non-rest steps
    pub fn hits(&self) -> usize {
        self.steps.iter().filter(|s| !s.is_rest()).count()
    }
}

impl FromStr for Tape {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Tape::new(s.split_whitespace().map(Step::from).collect()))
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

impl From<Vec<Step>> for Tape {
    fn from(steps: Vec<Step>) -> Self {
        Tape::new(steps)
    }
}

impl FromIterator<Step> for Tape {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Tape::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Tape {
    type Item = Step;
    type IntoIter = std::vec::IntoIter<Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

impl<'a> IntoIterator for &'a Tape {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_creation() {
        let s1 = Step::from(42);
        assert_eq!(s1.as_int(), Some(42));

        let s2 = Step::from("x");
        assert_eq!(s2.as_str(), Some("x"));
        assert_eq!(s2.as_int(), None);

        assert!(Step::from("-").is_rest());
        assert!(Step::from("").is_rest());
    }

    #[test]
    fn test_step_display() {
        assert_eq!(Step::from(7).to_string(), "7");
        assert_eq!(Step::Rest.to_string(), "-");
        assert_eq!(Step::Note(String::new()).to_string(), "-");
    }

    #[test]
    fn test_map_int_skips_rests_and_text() {
        assert_eq!(Step::from(3).map_int(|n| n + 2), Step::from(5));
        assert_eq!(Step::Rest.map_int(|n| n + 2), Step::Rest);
        assert_eq!(Step::from("60:1").map_int(|n| n + 2), Step::from("60:1"));
    }

    #[test]
    fn test_tape_parse_and_display() {
        let tape: Tape = "1 -  2 - 3".parse().unwrap();
        assert_eq!(tape.len(), 5);
        assert_eq!(tape.hits(), 3);
        assert_eq!(tape.to_string(), "1 - 2 - 3");
    }

    #[test]
    fn test_empty_tape() {
        let tape: Tape = "   ".parse().unwrap();
        assert!(tape.is_empty());
        assert_eq!(tape.to_string(), "");
    }

    #[test]
    fn test_tape_serializes_as_list() {
        let tape: Tape = "1 -".parse().unwrap();
        let json = serde_json::to_string(&tape).unwrap();
        assert_eq!(json, r#"[{"Note":"1"},"Rest"]"#);
    }
}

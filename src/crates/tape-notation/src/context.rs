//! Per-call configuration for the notation compiler.

use crate::error::{ContextError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Inclusive integer range used to derive the default note pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRange {
    pub min: i64,
    pub max: i64,
}

impl NoteRange {
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if min > max {
            return Err(ContextError::invalid_range(min, max));
        }
        Ok(NoteRange { min, max })
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl Default for NoteRange {
    fn default() -> Self {
        NoteRange { min: 1, max: 127 }
    }
}

impl fmt::Display for NoteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

impl FromStr for NoteRange {
    type Err = ContextError;

    /// Reads `min-max`, e.g. `36-84`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ContextError::invalid_option(s, "a note range like 36-84");
        let (min, max) = s.trim().split_once('-').ok_or_else(invalid)?;
        let min = min.trim().parse().map_err(|_| invalid())?;
        let max = max.trim().parse().map_err(|_| invalid())?;
        NoteRange::new(min, max)
    }
}

/// Bounds on work done for a single pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandLimits {
    /// Deepest group nesting (and `spread` recursion) that is honoured
    pub max_depth: usize,
    /// Most steps a single scope may hold
    pub max_steps: usize,
}

impl Default for ExpandLimits {
    fn default() -> Self {
        ExpandLimits {
            max_depth: 64,
            max_steps: 1 << 16,
        }
    }
}

/// Immutable configuration for one `parse` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternContext {
    /// Explicit pool for `?`; without one `?` draws from `range`
    notes: Option<Vec<String>>,
    range: NoteRange,
    vars: HashMap<String, String>,
    limits: ExpandLimits,
}

impl PatternContext {
    /// Create a context. Without explicit `notes` the pool is every value in `range`,
    /// drawn directly rather than listed.
    pub fn new(
        notes: Option<Vec<String>>,
        range: Option<NoteRange>,
        vars: HashMap<String, String>,
    ) -> Result<Self> {
        let range = range.unwrap_or_default();
        if range.min > range.max {
            return Err(ContextError::invalid_range(range.min, range.max));
        }

        if notes.as_ref().is_some_and(|notes| notes.is_empty()) {
            return Err(ContextError::EmptyNotePool);
        }

        PatternContext {
            notes,
            range,
            vars: HashMap::new(),
            limits: ExpandLimits::default(),
        }
        .with_vars(vars)
    }

    /// Replace the predefined variables, keeping the note pool and limits
    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Result<Self> {
        if let Some(name) = vars.keys().find(|name| !is_valid_name(name)) {
            return Err(ContextError::invalid_variable_name(name.as_str()));
        }
        self.vars = vars;
        Ok(self)
    }

    pub fn with_limits(mut self, limits: ExpandLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The explicit note pool, if one was given
    pub fn notes(&self) -> Option<&[String]> {
        self.notes.as_deref()
    }

    pub fn range(&self) -> NoteRange {
        self.range
    }

    pub fn vars(&self) -> &HashMap<String, String> {
        &self.vars
    }

    pub fn limits(&self) -> ExpandLimits {
        self.limits
    }
}

impl Default for PatternContext {
    fn default() -> Self {
        PatternContext {
            notes: None,
            range: NoteRange::default(),
            vars: HashMap::new(),
            limits: ExpandLimits::default(),
        }
    }
}

/// Variable names are `[A-Za-z0-9_]+`
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_name_char)
}

pub(crate) fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context() {
        let ctx = PatternContext::default();
        assert!(ctx.notes().is_none());
        assert_eq!(ctx.range(), NoteRange { min: 1, max: 127 });
        assert!(ctx.vars().is_empty());
    }

    #[test]
    fn test_notes_from_range() {
        let ctx = PatternContext::new(None, Some(NoteRange::new(60, 62).unwrap()), HashMap::new())
            .unwrap();
        assert!(ctx.notes().is_none());
        assert!(ctx.range().contains(61));
        assert!(!ctx.range().contains(63));
    }

    #[test]
    fn test_huge_range_is_not_listed() {
        let range = NoteRange::new(0, 4_000_000_000).unwrap();
        let ctx = PatternContext::new(None, Some(range), HashMap::new()).unwrap();
        assert_eq!(ctx.range(), range);
        assert!(ctx.notes().is_none());
    }

    #[test]
    fn test_with_vars_keeps_pool_and_limits() {
        let limits = ExpandLimits { max_depth: 3, max_steps: 10 };
        let ctx = PatternContext::new(Some(vec!["60".into()]), None, HashMap::new())
            .unwrap()
            .with_limits(limits)
            .with_vars(HashMap::from([("root".to_string(), "48".to_string())]))
            .unwrap();
        assert_eq!(ctx.notes(), Some(&["60".to_string()][..]));
        assert_eq!(ctx.limits(), limits);
        assert_eq!(ctx.vars()["root"], "48");
        assert!(ctx.with_vars(HashMap::from([("a b".to_string(), "1".to_string())])).is_err());
    }

    #[test]
    fn test_explicit_notes_win_over_range() {
        let notes = vec!["60".to_string(), "64".to_string()];
        let ctx = PatternContext::new(Some(notes.clone()), Some(NoteRange::default()), HashMap::new())
            .unwrap();
        assert_eq!(ctx.notes(), Some(notes.as_slice()));
    }

    #[test]
    fn test_empty_notes_rejected() {
        assert_eq!(
            PatternContext::new(Some(vec![]), None, HashMap::new()),
            Err(ContextError::EmptyNotePool)
        );
    }

    #[test]
    fn test_bad_variable_name_rejected() {
        let vars = HashMap::from([("not ok".to_string(), "1".to_string())]);
        assert!(PatternContext::new(None, None, vars).is_err());
    }

    #[test]
    fn test_range_from_str() {
        assert_eq!("36-84".parse::<NoteRange>().unwrap(), NoteRange { min: 36, max: 84 });
        assert!("84-36".parse::<NoteRange>().is_err());
        assert!("abc".parse::<NoteRange>().is_err());
    }
}

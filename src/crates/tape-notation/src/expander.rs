//! Expander for tape notation tokens
//!
//! Walks the token stream with an explicit stack of scopes instead of
//! recursion: `[` pushes a scope, `]` / `]*n` pops it into its parent.

use crate::context::{ExpandLimits, PatternContext};
use crate::token::Token;
use tape_core::{choose, RandomSource, Step, Tape};

/// Expand tokens into a flat tape
pub fn expand<R>(tokens: &[Token], ctx: &PatternContext, rng: &mut R) -> Tape
where
    R: RandomSource + ?Sized,
{
    let mut scopes = Scopes::new(ctx.limits());

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Rest(count) => scopes.push_rests(*count),
            Token::Note(text) => scopes.push(Step::Note(text.clone())),
            Token::Random => scopes.push(draw_note(ctx, rng)),
            Token::RandomRange { min, max } => {
                let value = rng.int_in_range(i64::from(*min), i64::from(*max));
                scopes.push(Step::from(value));
            }
            Token::GroupStart => scopes.open(),
            Token::GroupEnd | Token::GroupEndRepeat(_) => {
                let times = match token {
                    Token::GroupEndRepeat(n) => *n,
                    _ => 1,
                };
                if let Some(done) = scopes.close(times) {
                    let ignored = tokens.len() - i - 1;
                    if ignored > 0 {
                        tracing::debug!(ignored, "unmatched closing bracket ends the pattern");
                    }
                    return done;
                }
            }
            Token::Unknown(raw) => {
                tracing::debug!(lexeme = raw.as_str(), "dropping unrecognised lexeme");
            }
        }
    }

    scopes.finish()
}

/// A value for `?`: from the explicit pool, otherwise anywhere in the range
fn draw_note<R>(ctx: &PatternContext, rng: &mut R) -> Step
where
    R: RandomSource + ?Sized,
{
    match ctx.notes() {
        Some(pool) => choose(pool, rng)
            .map(|note| Step::from(note.as_str()))
            .unwrap_or(Step::Rest),
        None => {
            let range = ctx.range();
            Step::from(rng.int_in_range(range.min, range.max))
        }
    }
}

/// Stack of open scopes. The bottom scope is the pattern itself.
struct Scopes {
    stack: Vec<Vec<Step>>,
    limits: ExpandLimits,
    /// `[` seen past `max_depth`; their closers are ignored
    flattened: usize,
    truncated: bool,
}

impl Scopes {
    fn new(limits: ExpandLimits) -> Self {
        Scopes {
            stack: vec![Vec::new()],
            limits,
            flattened: 0,
            truncated: false,
        }
    }

    fn current(&mut self) -> &mut Vec<Step> {
        if self.stack.is_empty() {
            self.stack.push(Vec::new());
        }
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn room(&mut self) -> usize {
        let max = self.limits.max_steps;
        max.saturating_sub(self.current().len())
    }

    fn note_truncation(&mut self) {
        if !self.truncated {
            tracing::warn!(max_steps = self.limits.max_steps, "pattern too long, truncating");
            self.truncated = true;
        }
    }

    fn push(&mut self, step: Step) {
        if self.room() == 0 {
            self.note_truncation();
            return;
        }
        self.current().push(step);
    }

    fn push_rests(&mut self, count: usize) {
        let room = self.room();
        if count > room {
            self.note_truncation();
        }
        let scope = self.current();
        scope.extend(std::iter::repeat(Step::Rest).take(count.min(room)));
    }

    fn open(&mut self) {
        // The bottom scope does not count towards the depth
        if self.stack.len() > self.limits.max_depth {
            if self.flattened == 0 {
                tracing::warn!(max_depth = self.limits.max_depth, "groups nested too deeply, flattening");
            }
            self.flattened += 1;
            return;
        }
        self.stack.push(Vec::new());
    }

    /// Close the innermost scope, playing it `times` times. Returns the finished
    /// tape when the closed scope was the outermost one.
    fn close(&mut self, times: usize) -> Option<Tape> {
        if self.flattened > 0 {
            self.flattened -= 1;
            return None;
        }

        let scope = self.stack.pop().unwrap_or_default();
        let repeated = self.repeat(scope, times);

        if self.stack.is_empty() {
            return Some(Tape::new(repeated));
        }

        let room = self.room();
        if repeated.len() > room {
            self.note_truncation();
        }
        self.current().extend(repeated.into_iter().take(room));
        None
    }

    fn repeat(&mut self, scope: Vec<Step>, times: usize) -> Vec<Step> {
        if times == 1 || scope.is_empty() {
            return scope;
        }

        let wanted = scope.len().saturating_mul(times);
        if wanted > self.limits.max_steps {
            self.note_truncation();
        }

        scope
            .iter()
            .cycle()
            .take(wanted.min(self.limits.max_steps))
            .cloned()
            .collect()
    }

    /// Implicitly close every scope left open at end of input
    fn finish(mut self) -> Tape {
        loop {
            self.flattened = 0;
            if let Some(tape) = self.close(1) {
                return tape;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NoteRange;
    use crate::lexer::tokenize;
    use std::collections::HashMap;

    /// Replays scripted answers so expansions are predictable
    struct Scripted {
        picks: Vec<usize>,
        ints: Vec<i64>,
    }

    impl RandomSource for Scripted {
        fn pick_index(&mut self, len: usize) -> usize {
            self.picks.remove(0) % len
        }

        fn int_in_range(&mut self, min: i64, max: i64) -> i64 {
            self.ints.remove(0).clamp(min, max)
        }

        fn unit(&mut self) -> f64 {
            0.0
        }
    }

    fn expand_str(input: &str) -> String {
        let mut rng = Scripted {
            picks: vec![],
            ints: vec![],
        };
        expand(&tokenize(input), &PatternContext::default(), &mut rng).to_string()
    }

    #[test]
    fn test_expand_rests_and_notes() {
        assert_eq!(expand_str("- -*2 4"), "- - - 4");
        assert_eq!(expand_str("1 -*0 2"), "1 2");
    }

    #[test]
    fn test_expand_groups() {
        assert_eq!(expand_str("[ 1 2 3 ]"), "1 2 3");
        assert_eq!(expand_str("[ 1 [ 2 3 ] 4 ]"), "1 2 3 4");
    }

    #[test]
    fn test_expand_repeats() {
        assert_eq!(expand_str("[ 1 2 3 ]*2"), "1 2 3 1 2 3");
        assert_eq!(expand_str("[ 1 [ 2 ]*3 ]*2"), "1 2 2 2 1 2 2 2");
    }

    #[test]
    fn test_expand_drops_unknown() {
        assert_eq!(expand_str("1 foo 2 bar"), "1 2");
    }

    #[test]
    fn test_unclosed_group_closes_at_end() {
        assert_eq!(expand_str("1 [ 2 [ 3"), "1 2 3");
    }

    #[test]
    fn test_unmatched_close_ends_pattern() {
        assert_eq!(expand_str("1 2 ] 3 4"), "1 2");
        assert_eq!(expand_str("1 2 ]*2 3"), "1 2 1 2");
    }

    #[test]
    fn test_random_from_note_pool() {
        let ctx = PatternContext::new(
            Some(vec!["60".into(), "64".into(), "67".into()]),
            None,
            HashMap::new(),
        )
        .unwrap();
        let mut rng = Scripted {
            picks: vec![2, 0],
            ints: vec![],
        };
        let tape = expand(&tokenize("? - ?"), &ctx, &mut rng);
        assert_eq!(tape.to_string(), "67 - 60");
    }

    #[test]
    fn test_random_from_range_without_pool() {
        let ctx = PatternContext::new(None, Some(NoteRange::new(0, 4_000_000_000).unwrap()), HashMap::new())
            .unwrap();
        let mut rng = Scripted {
            picks: vec![],
            ints: vec![3_999_999_999, -5],
        };
        let tape = expand(&tokenize("? ?"), &ctx, &mut rng);
        assert_eq!(tape.to_string(), "3999999999 0");
    }

    #[test]
    fn test_random_range() {
        let mut rng = Scripted {
            picks: vec![],
            ints: vec![65, 200],
        };
        let tape = expand(&tokenize("?<60-72> ?<60-72>"), &PatternContext::default(), &mut rng);
        assert_eq!(tape.to_string(), "65 72");
    }

    #[test]
    fn test_depth_limit_flattens() {
        let ctx = PatternContext::default().with_limits(ExpandLimits {
            max_depth: 1,
            max_steps: 100,
        });
        let mut rng = Scripted {
            picks: vec![],
            ints: vec![],
        };
        // The inner group is flattened, so its `]*3` no longer repeats anything
        let tape = expand(&tokenize("[ 1 [ 2 ]*3 ]*2"), &ctx, &mut rng);
        assert_eq!(tape.to_string(), "1 2 1 2");
    }

    #[test]
    fn test_step_limit_truncates() {
        let ctx = PatternContext::default().with_limits(ExpandLimits {
            max_depth: 8,
            max_steps: 5,
        });
        let mut rng = Scripted {
            picks: vec![],
            ints: vec![],
        };
        assert_eq!(expand(&tokenize("[ 1 2 ]*100"), &ctx, &mut rng).len(), 5);
        assert_eq!(expand(&tokenize("-*1000000"), &ctx, &mut rng).len(), 5);
        assert_eq!(expand(&tokenize("1 2 3 4 5 6 7"), &ctx, &mut rng).len(), 5);
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let input = format!("{}1{}", "[ ".repeat(10_000), " ]".repeat(10_000));
        assert_eq!(expand_str(&input), "1");
    }
}

//! `preprocess → tokenize → expand → format`

use crate::context::PatternContext;
use crate::expander::expand;
use crate::formatter::format;
use crate::lexer::{tokenize, Lexer};
use crate::preprocessor::preprocess_at;
use crate::span::Span;
use serde::Serialize;
use tape_core::{RandomSource, Tape};

/// Expand a pattern to a tape string using the thread-local RNG
///
/// ```
/// use tape_notation::{parse, PatternContext};
///
/// let ctx = PatternContext::default();
/// assert_eq!(parse("[ 1 2 ]*2 -", &ctx), "1 2 1 2 -");
/// ```
pub fn parse(pattern: &str, ctx: &PatternContext) -> String {
    parse_with(pattern, ctx, &mut rand::thread_rng())
}

/// Expand a pattern to a tape string with an explicit random source
pub fn parse_with<R>(pattern: &str, ctx: &PatternContext, rng: &mut R) -> String
where
    R: RandomSource + ?Sized,
{
    format(&parse_tape(pattern, ctx, rng).steps)
}

/// Expand a pattern to its steps
pub fn parse_tape<R>(pattern: &str, ctx: &PatternContext, rng: &mut R) -> Tape
where
    R: RandomSource + ?Sized,
{
    compile(pattern, ctx, rng, 0)
}

pub(crate) fn compile<R>(pattern: &str, ctx: &PatternContext, rng: &mut R, depth: usize) -> Tape
where
    R: RandomSource + ?Sized,
{
    let text = preprocess_at(pattern, ctx, rng, depth);
    let tokens = tokenize(&text);
    expand(&tokens, ctx, rng)
}

/// A lexeme the expander will drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unrecognised {
    pub lexeme: String,
    pub span: Span,
}

/// What a pattern looks like after preprocessing, and which lexemes are ignored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// The preprocessed text the spans refer to
    pub text: String,
    pub unrecognised: Vec<Unrecognised>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.unrecognised.is_empty()
    }
}

/// Report lexemes that expansion would silently drop
///
/// `rng` drives the preprocessing, so the spans refer to the same text a
/// `parse_with` call with an identically seeded source would expand.
pub fn diagnostics<R>(pattern: &str, ctx: &PatternContext, rng: &mut R) -> Diagnostics
where
    R: RandomSource + ?Sized,
{
    report(preprocess_at(pattern, ctx, rng, 0))
}

/// Expand a pattern and report its dropped lexemes from a single preprocessing pass
pub fn parse_with_diagnostics<R>(pattern: &str, ctx: &PatternContext, rng: &mut R) -> (Tape, Diagnostics)
where
    R: RandomSource + ?Sized,
{
    let text = preprocess_at(pattern, ctx, rng, 0);
    let tokens = tokenize(&text);
    let tape = expand(&tokens, ctx, rng);
    (tape, report(text))
}

fn report(text: String) -> Diagnostics {
    let unrecognised = Lexer::new(&text)
        .filter(|(token, _)| token.is_unknown())
        .map(|(_, span)| Unrecognised {
            lexeme: span.slice(&text).to_string(),
            span,
        })
        .collect();

    Diagnostics { text, unrecognised }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessor::preprocess;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_diagnostics_reports_unknown_lexemes() {
        let report = diagnostics("1 foo [ 2 ]*0", &PatternContext::default(), &mut rand::thread_rng());
        let lexemes: Vec<_> = report.unrecognised.iter().map(|u| u.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["foo", "]*0"]);
        assert_eq!(report.unrecognised[0].span, Span::new(2, 5));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_diagnostics_clean_pattern() {
        let report = diagnostics("$x = 1 2 [ $x ]*2 E(3,8)", &PatternContext::default(), &mut rand::thread_rng());
        assert!(report.is_clean());
    }

    #[test]
    fn test_diagnostics_follow_the_seed() {
        let ctx = PatternContext::default();
        let pattern = "spread(? foo ?, 5) bar";

        for seed in 0..8 {
            let (tape, report) = parse_with_diagnostics(pattern, &ctx, &mut StdRng::seed_from_u64(seed));
            assert_eq!(format(&tape.steps), parse_with(pattern, &ctx, &mut StdRng::seed_from_u64(seed)));
            assert_eq!(report.text, preprocess(pattern, &ctx, &mut StdRng::seed_from_u64(seed)));
            assert_eq!(report, diagnostics(pattern, &ctx, &mut StdRng::seed_from_u64(seed)));

            let lexemes: Vec<_> = report.unrecognised.iter().map(|u| u.span.slice(&report.text)).collect();
            assert!(lexemes.contains(&"bar"));
            assert!(lexemes.iter().all(|l| *l == "foo" || *l == "bar"));
        }
    }

    #[test]
    fn test_parse_tape_steps() {
        let tape = parse_tape("1 - 2", &PatternContext::default(), &mut rand::thread_rng());
        assert_eq!(tape.len(), 3);
        assert!(tape.steps[1].is_rest());
    }
}

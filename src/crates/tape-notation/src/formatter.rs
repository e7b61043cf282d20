// Formatter: render expanded steps as a tape, and tokens back as notation
use crate::token::Token;
use tape_core::{Step, REST};

/// Join steps with single spaces; rests and empty literals become `-`
pub fn format(steps: &[Step]) -> String {
    steps
        .iter()
        .map(|step| match step {
            Step::Note(text) if !text.is_empty() => text.as_str(),
            _ => REST,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render tokens back to tape notation, one lexeme each
pub fn format_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|token| token.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

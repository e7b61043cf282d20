//! Slash rhythm notation.
//!
//! A rhythm is a whitespace-separated list of note values: `/4` is a quarter
//! note (one beat), `/8` an eighth, `/4.` a dotted quarter and `/8t` an eighth
//! triplet. Rhythms are paired with note tapes to produce `note:duration`
//! elements.

use tape_core::{Step, Tape, REST};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RhythmError {
    #[error("rests are not allowed in a rhythm (position {position})")]
    Rest { position: usize },

    #[error("invalid duration '{lexeme}', expected /1 /2 /4 /8 /16 or /32 with optional . or t")]
    InvalidDuration { lexeme: String },

    #[error("rhythm is empty")]
    Empty,
}

pub type Result<T> = std::result::Result<T, RhythmError>;

/// Length in beats of a single slash duration
pub fn duration_beats(lexeme: &str) -> Result<f64> {
    let invalid = || RhythmError::InvalidDuration {
        lexeme: lexeme.to_string(),
    };

    let body = lexeme.strip_prefix('/').ok_or_else(invalid)?;
    let (digits, modifier) = match body.char_indices().last() {
        Some((i, c)) if c == '.' || c == 't' => (&body[..i], Some(c)),
        _ => (body, None),
    };

    let base = match digits {
        "1" => 4.0,
        "2" => 2.0,
        "4" => 1.0,
        "8" => 0.5,
        "16" => 0.25,
        "32" => 0.125,
        _ => return Err(invalid()),
    };

    Ok(match modifier {
        Some('.') => base * 1.5,
        Some(_) => base * 2.0 / 3.0,
        None => base,
    })
}

/// Parse a rhythm into durations in beats
pub fn parse_rhythm(text: &str) -> Result<Vec<f64>> {
    let durations = text
        .split_whitespace()
        .enumerate()
        .map(|(position, lexeme)| {
            if lexeme == REST {
                Err(RhythmError::Rest { position })
            } else {
                duration_beats(lexeme)
            }
        })
        .collect::<Result<Vec<_>>>()?;

    if durations.is_empty() {
        return Err(RhythmError::Empty);
    }
    Ok(durations)
}

/// Render a duration without float noise: `0.5`, `1`, `0.6667`
pub fn format_duration(beats: f64) -> String {
    let text = format!("{:.4}", beats);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Pair each step of `notes` with a duration, cycling the rhythm
///
/// Rests render as `-:d` so the timing of the silence is kept.
pub fn apply_rhythm(notes: &Tape, rhythm: &str) -> Result<Tape> {
    let durations = parse_rhythm(rhythm)?;
    Ok(apply_durations(notes, &durations))
}

/// Pair steps with already parsed durations, cycling them
pub fn apply_durations(notes: &Tape, durations: &[f64]) -> Tape {
    if durations.is_empty() {
        return notes.clone();
    }

    notes
        .iter()
        .zip(durations.iter().cycle())
        .map(|(step, &beats)| Step::Note(format!("{}:{}", step, format_duration(beats))))
        .collect()
}

/// Swing consecutive pairs of equal durations
///
/// The first of each pair is lengthened by `amount` of its value and the second
/// shortened by the same, so every pair keeps its total length.
pub fn swing(durations: &[f64], amount: f64) -> Vec<f64> {
    let amount = amount.clamp(0.0, 1.0);
    let mut out = durations.to_vec();

    for pair in out.chunks_exact_mut(2) {
        if (pair[0] - pair[1]).abs() < f64::EPSILON {
            let delta = pair[0] * amount;
            pair[0] += delta;
            pair[1] -= delta;
        }
    }
    out
}

/// Total length of a rhythm in beats
pub fn total_beats(durations: &[f64]) -> f64 {
    durations.iter().sum()
}

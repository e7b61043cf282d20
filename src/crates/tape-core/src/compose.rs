//! Composition helpers over expanded tapes.
//!
//! Unlike the notation parser these helpers are strict: arithmetic that has
//! no meaning on an empty tape is reported to the caller.

use crate::error::{Result, TapeError};
use crate::random::RandomSource;
use crate::step::{Step, Tape};

/// Repeat - play the whole tape `times` times
pub fn repeat(tape: &Tape, times: usize) -> Result<Tape> {
    if tape.is_empty() {
        return Err(TapeError::empty_pattern("repeat"));
    }

    let total = tape
        .len()
        .checked_mul(times)
        .ok_or_else(|| TapeError::invalid_argument("repeat", format!("{} copies do not fit", times)))?;

    Ok(tape.iter().cycle().take(total).cloned().collect())
}

/// Rotate - shift steps left by `steps` (negative values rotate right)
pub fn rotate(tape: &Tape, steps: i64) -> Result<Tape> {
    if tape.is_empty() {
        return Err(TapeError::empty_pattern("rotate"));
    }

    let len = tape.len() as i64;
    let shift = steps.rem_euclid(len) as usize;

    let mut out = tape.steps.clone();
    out.rotate_left(shift);
    Ok(Tape::new(out))
}

/// Reverse - play the tape backwards
pub fn reverse(tape: &Tape) -> Tape {
    tape.iter().rev().cloned().collect()
}

/// Transpose - add `semitones` to every integer step
///
/// Rests and non-integer literals pass through unchanged.
pub fn transpose(tape: &Tape, semitones: i64) -> Tape {
    tape.iter().map(|s| s.map_int(|n| n + semitones)).collect()
}

/// Interleave - alternate steps from two tapes, continuing with the longer one
pub fn interleave(a: &Tape, b: &Tape) -> Tape {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let mut left = a.iter();
    let mut right = b.iter();

    loop {
        match (left.next(), right.next()) {
            (None, None) => break,
            (x, y) => {
                out.extend(x.cloned());
                out.extend(y.cloned());
            }
        }
    }

    Tape::new(out)
}

/// Choose with weights - select one option using weighted probabilities
///
/// # Arguments
/// * `options` - (value, weight) pairs; non-positive weights are never chosen
/// * `rng` - source of randomness
pub fn choose_weighted<'a, T>(
    options: &'a [(T, f64)],
    rng: &mut (impl RandomSource + ?Sized),
) -> Result<&'a T> {
    let total_weight: f64 = options.iter().map(|(_, w)| w.max(0.0)).sum();

    if options.is_empty() || total_weight <= 0.0 || !total_weight.is_finite() {
        return Err(TapeError::invalid_argument(
            "choose_weighted",
            "at least one option needs a positive weight",
        ));
    }

    // Generate random value in [0, total_weight)
    let random_value = rng.unit() * total_weight;

    let mut cumulative = 0.0;
    for (value, weight) in options {
        if *weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        if random_value < cumulative {
            return Ok(value);
        }
    }

    // Floating point slack lands on the last positive option
    options
        .iter()
        .rev()
        .find(|(_, w)| *w > 0.0)
        .map(|(value, _)| value)
        .ok_or_else(|| TapeError::invalid_argument("choose_weighted", "no positive weight"))
}

/// Concatenate tapes back to back
pub fn concat<'a>(tapes: impl IntoIterator<Item = &'a Tape>) -> Tape {
    tapes.into_iter().flat_map(|t| t.iter().cloned()).collect()
}

/// Replace every non-rest step with `value`, keeping the rhythm
pub fn fill(rhythm: &Tape, value: &str) -> Tape {
    rhythm
        .iter()
        .map(|s| if s.is_rest() { Step::Rest } else { Step::from(value) })
        .collect()
}

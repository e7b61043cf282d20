//! Melody generation over scale degrees.
//!
//! Generated melodies are tapes of 1-based scale degrees, ready for
//! [`crate::music_theory::scale_tape`].

use crate::rhythm::{self, RhythmError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tape_core::{compose, RandomSource, Step, Tape};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MelodyError {
    #[error("unknown contour '{0}', expected ascending, descending, arch, valley or random")]
    UnknownContour(String),

    #[error("complexity must be between 0 and 1, got {0}")]
    InvalidComplexity(String),

    #[error("melody length {length} is more than the limit of {max}")]
    TooLong { length: usize, max: usize },
}

/// Longest melody `generate` will produce
pub const MAX_LENGTH: usize = 1 << 16;

/// Overall shape of a generated melody
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Contour {
    Ascending,
    Descending,
    Arch,
    Valley,
    Random,
}

impl Contour {
    /// Target height in `0..=1` at position `t` in `0..=1`
    fn height(self, t: f64) -> Option<f64> {
        match self {
            Contour::Ascending => Some(t),
            Contour::Descending => Some(1.0 - t),
            Contour::Arch => Some(1.0 - (2.0 * t - 1.0).abs()),
            Contour::Valley => Some((2.0 * t - 1.0).abs()),
            Contour::Random => None,
        }
    }
}

impl FromStr for Contour {
    type Err = MelodyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ascending" | "up" => Ok(Contour::Ascending),
            "descending" | "down" => Ok(Contour::Descending),
            "arch" => Ok(Contour::Arch),
            "valley" => Ok(Contour::Valley),
            "random" => Ok(Contour::Random),
            _ => Err(MelodyError::UnknownContour(s.to_string())),
        }
    }
}

impl fmt::Display for Contour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Contour::Ascending => "ascending",
            Contour::Descending => "descending",
            Contour::Arch => "arch",
            Contour::Valley => "valley",
            Contour::Random => "random",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MelodyParams {
    /// Number of steps
    pub length: usize,
    pub contour: Contour,
    /// 0.0 is stepwise and rest-free, 1.0 leaps and rests freely
    pub complexity: f64,
    /// Highest degree used, starting from 1
    pub degree_span: i64,
}

impl MelodyParams {
    pub fn new(length: usize, contour: Contour, complexity: f64) -> Result<Self, MelodyError> {
        if !(0.0..=1.0).contains(&complexity) {
            return Err(MelodyError::InvalidComplexity(complexity.to_string()));
        }
        if length > MAX_LENGTH {
            return Err(MelodyError::TooLong {
                length,
                max: MAX_LENGTH,
            });
        }
        Ok(MelodyParams {
            length,
            contour,
            complexity,
            degree_span: 7,
        })
    }

    /// Largest jump between consecutive sounding degrees
    pub fn max_leap(&self) -> i64 {
        1 + (self.complexity.clamp(0.0, 1.0) * 3.0).round() as i64
    }

    fn rest_probability(&self) -> f64 {
        self.complexity.clamp(0.0, 1.0) * 0.3
    }
}

impl Default for MelodyParams {
    fn default() -> Self {
        MelodyParams {
            length: 8,
            contour: Contour::Arch,
            complexity: 0.3,
            degree_span: 7,
        }
    }
}

/// Generate a tape of scale degrees following the contour
///
/// Lengths past [`MAX_LENGTH`] are cut to it.
pub fn generate<R>(params: &MelodyParams, rng: &mut R) -> Tape
where
    R: RandomSource + ?Sized,
{
    let span = params.degree_span.max(1);
    let leap = params.max_leap();
    let jitter = (params.complexity.clamp(0.0, 1.0) * 2.0).round() as i64;
    let rest_probability = params.rest_probability();

    let length = params.length.min(MAX_LENGTH);
    let mut previous: Option<i64> = None;
    let mut steps = Vec::with_capacity(length);

    for i in 0..length {
        let t = if length > 1 {
            i as f64 / (length - 1) as f64
        } else {
            0.0
        };

        let target = match (params.contour.height(t), previous) {
            (Some(h), _) => 1 + (h * (span - 1) as f64).round() as i64 + rng.int_in_range(-jitter, jitter),
            (None, Some(prev)) => prev + rng.int_in_range(-leap, leap),
            (None, None) => rng.int_in_range(1, span),
        };

        let degree = match previous {
            Some(prev) => prev + (target - prev).clamp(-leap, leap),
            None => target,
        }
        .clamp(1, span);

        // The first step always sounds
        if previous.is_some() && rest_probability > 0.0 && rng.unit() < rest_probability {
            steps.push(Step::Rest);
            continue;
        }

        previous = Some(degree);
        steps.push(Step::from(degree));
    }

    Tape::new(steps)
}

/// Generate a melody and pair it with a rhythm
pub fn generate_with_rhythm<R>(
    params: &MelodyParams,
    rhythm_text: &str,
    rng: &mut R,
) -> Result<Tape, RhythmError>
where
    R: RandomSource + ?Sized,
{
    rhythm::apply_rhythm(&generate(params, rng), rhythm_text)
}

/// Retrograde - the melody backwards
pub fn retrograde(tape: &Tape) -> Tape {
    compose::reverse(tape)
}

/// Invert - mirror every degree around `axis`
pub fn invert(tape: &Tape, axis: i64) -> Tape {
    tape.iter().map(|s| s.map_int(|d| 2 * axis - d)).collect()
}

/// Sequence - `steps` copies of the motif, each shifted by `degree_shift`
pub fn sequence(tape: &Tape, steps: usize, degree_shift: i64) -> Tape {
    let copies: Vec<Tape> = (0..steps as i64)
        .map(|i| compose::transpose(tape, i * degree_shift))
        .collect();
    compose::concat(&copies)
}

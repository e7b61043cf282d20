//! Euclidean rhythm generation using a Bjorklund-style grouping
//!
//! Pulses are paired with rests group by group. Folding continues only while
//! pulses are left over; leftover rests trail the pattern untouched, so
//! `(3, 8)` gives `x.x.x...` and `(5, 8)` gives `x.xx.xx.`.

use crate::step::{Step, Tape};

/// Spread `pulse` hits as evenly as possible over `step` slots, then rotate
/// left by `rotation`. `true` is a hit.
///
/// ```
/// use tape_core::euclid::bjorklund;
///
/// assert_eq!(bjorklund(3, 8, 0), [true, false, true, false, true, false, false, false]);
/// ```
pub fn bjorklund(pulse: usize, step: usize, rotation: usize) -> Vec<bool> {
    if step == 0 {
        return Vec::new();
    }

    if pulse == 0 {
        return vec![false; step];
    }

    if pulse >= step {
        return vec![true; step];
    }

    let mut front: Vec<Vec<bool>> = vec![vec![true]; pulse];
    let mut back: Vec<Vec<bool>> = vec![vec![false]; step - pulse];

    loop {
        let pairs = front.len().min(back.len());
        let pulse_surplus = front.len() > back.len();

        let remainder = if pulse_surplus {
            front.split_off(pairs)
        } else {
            back.split_off(pairs)
        };

        for (group, tail) in front.iter_mut().zip(back.drain(..)) {
            group.extend(tail);
        }

        back = remainder;

        if !pulse_surplus || back.len() <= 1 {
            break;
        }
    }

    let mut result: Vec<bool> = front.into_iter().chain(back).flatten().collect();
    result.rotate_left(rotation % step);
    result
}

/// Render a Euclidean rhythm as tape steps (`1` for a pulse, rest otherwise)
pub fn euclid_steps(pulse: usize, step: usize, rotation: usize) -> Tape {
    bjorklund(pulse, step, rotation)
        .into_iter()
        .map(|hit| if hit { Step::from(1) } else { Step::Rest })
        .collect()
}

/// Render a Euclidean rhythm as a tape string, e.g. `"1 - 1 - 1 - - -"`
pub fn euclid_tape(pulse: usize, step: usize, rotation: usize) -> String {
    euclid_steps(pulse, step, rotation).to_string()
}

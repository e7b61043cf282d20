//! Random source capability used by `?` tokens and generators.
//!
//! Every `rand::Rng` is a `RandomSource`, so callers can pass
//! `rand::thread_rng()`, a seeded `StdRng`, or a scripted source in tests.

use rand::Rng;

pub trait RandomSource {
    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize;

    /// Uniform integer in `min..=max`.
    fn int_in_range(&mut self, min: i64, max: i64) -> i64;

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn pick_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }

    fn int_in_range(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.gen_range(min..=max)
    }

    fn unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Pick a uniformly random element of a slice
pub fn choose<'a, T>(items: &'a [T], rng: &mut (impl RandomSource + ?Sized)) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    Some(&items[rng.pick_index(items.len())])
}

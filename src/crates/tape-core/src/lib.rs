//! Core types and algorithms for tape notation
//!
//! A tape is the flat, space-separated sequence of rests (`-`) and literal
//! values that every part of the tape toolchain produces and consumes. This
//! crate holds the tape data model and the algorithms the notation compiler
//! builds on.
//!
//! # Examples
//!
//! ```
//! use tape_core::{euclid_tape, spread, Tape};
//!
//! assert_eq!(euclid_tape(3, 8, 0), "1 - 1 - 1 - - -");
//!
//! let tape: Tape = "1 2 3".parse().unwrap();
//! let stretched: Tape = spread(&tape.steps, 6).unwrap().into();
//! assert_eq!(stretched.to_string(), "1 1 2 2 3 3");
//! ```
//!
//! # Main Components
//!
//! - **Step / Tape**: the interchange data model
//! - **euclid**: Euclidean rhythm generation
//! - **spread**: resampling a tape to a new length
//! - **compose**: strict composition helpers (repeat, rotate, transpose, ...)
//! - **random**: the injectable random source used by `?` tokens

pub mod compose;
pub mod error;
pub mod euclid;
pub mod random;
pub mod spread;
pub mod step;

pub use compose::{choose_weighted, concat, fill, interleave, repeat, reverse, rotate, transpose};
pub use error::{Result, TapeError};
pub use euclid::{bjorklund, euclid_steps, euclid_tape};
pub use random::{choose, RandomSource};
pub use spread::spread;
pub use step::{Step, Tape, REST};

//! Tape notation compiler
//!
//! This crate expands tape notation, a compact text form for note sequences,
//! into a flat tape of space-separated rests (`-`) and integer literals.
//!
//! # Examples
//!
//! ```
//! use tape_notation::{parse, PatternContext};
//!
//! let ctx = PatternContext::default();
//! assert_eq!(parse("[ 1 [ 2 3 ] 4 ]", &ctx), "1 2 3 4");
//! assert_eq!(parse("E(3,8)", &ctx), "1 - 1 - 1 - - -");
//! assert_eq!(parse("$x = 1 7 [ $x ]*2", &ctx), "1 7 1 7");
//! ```
//!
//! # Notation Syntax
//!
//! - Rests: `-`, or `-*3` for three of them
//! - Notes: integers such as `60` or `-5`
//! - Groups: `[ 1 2 ]`, repeated with `]*n`
//! - Random values: `?` (from the note pool) and `?<60-72>`
//! - Euclidean rhythms: `E(3,8)` or `E(3,8,1)` with rotation
//! - Resampling: `spread(1 2 3, 6)`
//! - Variables: `$name = value` and `$name`
//!
//! Parsing never fails: lexemes it does not understand are dropped, and
//! brackets are closed or ignored as needed. Use [`diagnostics`] to see what
//! was dropped.
//!
//! # Main Functions
//!
//! - [`parse`]: expand a pattern to a tape string
//! - [`parse_with`] / [`parse_tape`]: the same with an explicit random source
//! - [`preprocess`], [`tokenize`], [`expand`], [`format()`]: the individual stages

pub mod context;
pub mod error;
pub mod expander;
pub mod formatter;
pub mod lexer;
pub mod pipeline;
pub mod preprocessor;
pub mod span;
pub mod token;


pub use context::{ExpandLimits, NoteRange, PatternContext};
pub use error::{ContextError, Result};
pub use expander::expand;
pub use formatter::{format, format_tokens};
pub use lexer::{classify, tokenize, Lexer};
pub use pipeline::{diagnostics, parse, parse_tape, parse_with, parse_with_diagnostics, Diagnostics, Unrecognised};
pub use preprocessor::{expand_functions, preprocess, substitute_variables};
pub use span::Span;
pub use token::Token;

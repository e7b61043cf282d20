//! Tape console library
//!
//! Everything around the notation compiler that works on finished tapes:
//! scales and chords, slash rhythms, melody generation, UDP transport and the
//! line console that ties them together.

pub mod config;
pub mod console;
pub mod logging;
pub mod melody;
pub mod music_theory;
pub mod rhythm;
pub mod transport;

pub use config::{AppConfig, ConfigError};
pub use console::{Console, ConsoleError, Outcome};
pub use melody::{Contour, MelodyError, MelodyParams};
pub use music_theory::MusicError;
pub use rhythm::RhythmError;
pub use transport::{TapeSender, TransportError};

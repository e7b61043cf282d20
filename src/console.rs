//! Line-oriented console over any reader/writer pair.

use crate::melody::{self, Contour, MelodyError, MelodyParams};
use crate::music_theory::{self, MusicError};
use crate::rhythm::{self, RhythmError};
use crate::transport::{TapeSender, TransportError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use tape_core::{euclid_tape, spread, Tape, TapeError};
use tape_notation::{context::is_valid_name, expand_functions, parse_tape, ContextError, PatternContext};
use thiserror::Error;
use tracing::debug;

const HELP: &str = "\
commands:
  parse <pattern>                         expand a pattern (also the default)
  send <pattern>                          expand and send over UDP
  euclid <k> <n> [rotation]               Euclidean rhythm
  spread <n> <pattern>                    resample a pattern to n steps
  scale <name> <root> <octave> <pattern>  degrees to MIDI notes
  melody <length> <contour> <complexity>  generate scale degrees
  rhythm <rhythm> | <pattern>             pair notes with durations
  let <name> = <value>                    define a session variable
  seed <n>                                reseed the random source
  help                                    show this text
  quit | exit                             leave";

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("invalid number '{0}'")]
    Number(String),

    #[error("no transport configured")]
    NoTransport,

    #[error("{op}: {length} steps is more than the limit of {max}")]
    TooLong {
        op: &'static str,
        length: usize,
        max: usize,
    },

    #[error(transparent)]
    Tape(#[from] TapeError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Music(#[from] MusicError),

    #[error(transparent)]
    Rhythm(#[from] RhythmError),

    #[error(transparent)]
    Melody(#[from] MelodyError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// What a single line produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Output(String),
    Silent,
    Quit,
}

pub struct Console {
    base: PatternContext,
    session_vars: HashMap<String, String>,
    rng: StdRng,
    sender: Option<TapeSender>,
}

impl Console {
    pub fn new(base: PatternContext, seed: Option<u64>) -> Self {
        Console {
            base,
            session_vars: HashMap::new(),
            rng: make_rng(seed),
            sender: None,
        }
    }

    pub fn with_sender(mut self, sender: TapeSender) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn session_vars(&self) -> &HashMap<String, String> {
        &self.session_vars
    }

    /// Read commands until end of input or `quit`; errors are reported and skipped
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            match self.execute(&line) {
                Ok(Outcome::Output(text)) => writeln!(output, "{}", text)?,
                Ok(Outcome::Silent) => {}
                Ok(Outcome::Quit) => break,
                Err(e) => writeln!(output, "error: {}", e)?,
            }
            output.flush()?;
        }
        Ok(())
    }

    /// Run one console line
    pub fn execute(&mut self, line: &str) -> Result<Outcome, ConsoleError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Outcome::Silent);
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        debug!("console command '{}'", command);

        match command {
            "parse" => Ok(Outcome::Output(self.expand(rest)?.to_string())),
            "send" => self.send(rest),
            "euclid" => self.euclid(rest),
            "spread" => self.spread(rest),
            "scale" => self.scale(rest),
            "melody" => self.melody(rest),
            "rhythm" => self.rhythm(rest),
            "let" => self.define(rest),
            "seed" => {
                let seed = number(rest.split_whitespace().next().unwrap_or_default())
                    .map_err(|_| ConsoleError::Usage("seed <n>"))?;
                self.rng = StdRng::seed_from_u64(seed);
                Ok(Outcome::Silent)
            }
            "help" => Ok(Outcome::Output(HELP.to_string())),
            "quit" | "exit" => Ok(Outcome::Quit),
            _ => Ok(Outcome::Output(self.expand(line)?.to_string())),
        }
    }

    /// The base context with session variables layered on top
    fn context(&self) -> Result<PatternContext, ConsoleError> {
        if self.session_vars.is_empty() {
            return Ok(self.base.clone());
        }

        let mut vars = self.base.vars().clone();
        vars.extend(self.session_vars.clone());
        Ok(self.base.clone().with_vars(vars)?)
    }

    fn expand(&mut self, pattern: &str) -> Result<Tape, ConsoleError> {
        let ctx = self.context()?;
        Ok(parse_tape(pattern, &ctx, &mut self.rng))
    }

    fn send(&mut self, pattern: &str) -> Result<Outcome, ConsoleError> {
        let tape = self.expand(pattern)?.to_string();
        let sender = self.sender.as_ref().ok_or(ConsoleError::NoTransport)?;
        sender.send(&tape)?;
        Ok(Outcome::Output(format!("sent: {}", tape)))
    }

    fn spread(&mut self, args: &str) -> Result<Outcome, ConsoleError> {
        const USAGE: &str = "spread <n> <pattern>";
        let (length, pattern) = args.split_once(char::is_whitespace).ok_or(ConsoleError::Usage(USAGE))?;
        let length: usize = number(length)?;
        self.check_length("spread", length)?;

        let tape = self.expand(pattern)?;
        let steps = spread(&tape.steps, length)?;
        Ok(Outcome::Output(Tape::new(steps).to_string()))
    }

    fn euclid(&self, args: &str) -> Result<Outcome, ConsoleError> {
        const USAGE: &str = "euclid <k> <n> [rotation]";
        let parts: Vec<&str> = args.split_whitespace().collect();
        let (pulse, step, rotation) = match parts[..] {
            [k, n] => (number(k)?, number(n)?, 0),
            [k, n, r] => (number(k)?, number(n)?, number(r)?),
            _ => return Err(ConsoleError::Usage(USAGE)),
        };
        self.check_length("euclid", step)?;
        Ok(Outcome::Output(euclid_tape(pulse, step, rotation)))
    }

    /// Generated tapes are held to the same step limit as expanded patterns
    fn check_length(&self, op: &'static str, length: usize) -> Result<(), ConsoleError> {
        let max = self.base.limits().max_steps;
        if length > max {
            return Err(ConsoleError::TooLong { op, length, max });
        }
        Ok(())
    }

    fn scale(&mut self, args: &str) -> Result<Outcome, ConsoleError> {
        const USAGE: &str = "scale <name> <root> <octave> <pattern>";
        let mut parts = args.splitn(4, char::is_whitespace);
        let (Some(name), Some(root), Some(octave), Some(pattern)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ConsoleError::Usage(USAGE));
        };
        let octave: i64 = number(octave)?;

        let degrees = self.expand(pattern)?;
        let notes = music_theory::scale_tape(&degrees, name, root, octave)?;
        Ok(Outcome::Output(notes.to_string()))
    }

    fn melody(&mut self, args: &str) -> Result<Outcome, ConsoleError> {
        const USAGE: &str = "melody <length> <contour> <complexity>";
        let parts: Vec<&str> = args.split_whitespace().collect();
        let [length, contour, complexity] = parts[..] else {
            return Err(ConsoleError::Usage(USAGE));
        };

        let contour: Contour = contour.parse()?;
        let params = MelodyParams::new(number(length)?, contour, number(complexity)?)?;
        Ok(Outcome::Output(melody::generate(&params, &mut self.rng).to_string()))
    }

    fn rhythm(&mut self, args: &str) -> Result<Outcome, ConsoleError> {
        let (rhythm_text, pattern) = args
            .split_once('|')
            .ok_or(ConsoleError::Usage("rhythm <rhythm> | <pattern>"))?;

        let notes = self.expand(pattern.trim())?;
        let out = rhythm::apply_rhythm(&notes, rhythm_text.trim())?;
        Ok(Outcome::Output(out.to_string()))
    }

    fn define(&mut self, args: &str) -> Result<Outcome, ConsoleError> {
        const USAGE: &str = "let <name> = <value>";
        let (name, value) = args.split_once('=').ok_or(ConsoleError::Usage(USAGE))?;
        let name = name.trim().trim_start_matches('$');
        if !is_valid_name(name) {
            return Err(ContextError::invalid_variable_name(name).into());
        }

        // Variables are substituted after function calls, so expand calls now
        let ctx = self.context()?;
        let value = expand_functions(value, &ctx, &mut self.rng);
        self.session_vars.insert(name.to_string(), value.trim().to_string());
        Ok(Outcome::Silent)
    }
}

fn number<T: std::str::FromStr>(text: &str) -> Result<T, ConsoleError> {
    text.trim()
        .parse()
        .map_err(|_| ConsoleError::Number(text.to_string()))
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use tape_core::{euclid_tape, spread, Tape};
use tape_notation::{
    format, format_tokens, parse_with, parse_with_diagnostics, preprocess, tokenize, ExpandLimits, NoteRange,
    PatternContext,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tape-notation")]
#[command(about = "Expand and inspect tape notation patterns", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a pattern to a tape
    Parse {
        /// Pattern to expand
        pattern: String,

        /// Note pool for `?`, comma separated (default: every value in --range)
        #[arg(short, long, value_delimiter = ',')]
        notes: Option<Vec<String>>,

        /// Range for the default note pool, e.g. 36-84
        #[arg(short, long)]
        range: Option<NoteRange>,

        /// Predefined variable, e.g. --var root=60 (repeatable)
        #[arg(long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,

        /// Seed for reproducible random values
        #[arg(short, long)]
        seed: Option<u64>,

        /// Also report lexemes that were dropped
        #[arg(long)]
        check: bool,
    },
    /// Show the tokens of a pattern after preprocessing
    Tokens {
        /// Pattern to tokenize
        pattern: String,

        /// Output format (json or debug)
        #[arg(short, long, default_value = "debug")]
        format: String,
    },
    /// Print a Euclidean rhythm
    Euclid {
        /// Number of hits
        pulse: usize,

        /// Number of steps
        step: usize,

        /// Rotate left by this many steps
        #[arg(short, long, default_value = "0")]
        rotation: usize,
    },
    /// Resample an expanded pattern to a new length
    Spread {
        /// Target length
        length: usize,

        /// Pattern to expand and resample
        pattern: String,
    },
}

fn parse_var(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| format!("expected name=value, got '{}'", s))
}

/// Generated tapes are held to the same step limit as expanded patterns
fn check_length(op: &str, length: usize) -> Result<()> {
    let max = ExpandLimits::default().max_steps;
    if length > max {
        bail!("{}: {} steps is more than the limit of {}", op, length, max);
    }
    Ok(())
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            pattern,
            notes,
            range,
            vars,
            seed,
            check,
        } => {
            let vars: HashMap<String, String> = vars.into_iter().collect();
            let ctx = PatternContext::new(notes, range, vars).context("invalid pattern options")?;
            let mut rng = make_rng(seed);

            if !check {
                println!("{}", parse_with(&pattern, &ctx, &mut rng));
                return Ok(());
            }

            let (tape, report) = parse_with_diagnostics(&pattern, &ctx, &mut rng);
            println!("{}", format(&tape.steps));
            for dropped in &report.unrecognised {
                eprintln!("✗ dropped '{}' at {}", dropped.lexeme, dropped.span);
            }
            if report.is_clean() {
                eprintln!("✓ every lexeme was recognised");
            }
            Ok(())
        }
        Commands::Tokens { pattern, format } => {
            let ctx = PatternContext::default();
            let text = preprocess(&pattern, &ctx, &mut rand::thread_rng());
            let tokens = tokenize(&text);

            match format.as_str() {
                "json" => {
                    let json = serde_json::to_string_pretty(&tokens)?;
                    println!("{}", json);
                }
                _ => {
                    println!("Preprocessed: {}", format_tokens(&tokens));
                    println!("Tokens: {}", tokens.len());
                    for (i, token) in tokens.iter().enumerate() {
                        println!("  [{}] {:?}", i, token);
                    }
                }
            }
            Ok(())
        }
        Commands::Euclid { pulse, step, rotation } => {
            check_length("euclid", step)?;
            println!("{}", euclid_tape(pulse, step, rotation));
            Ok(())
        }
        Commands::Spread { length, pattern } => {
            check_length("spread", length)?;
            let tape = tape_notation::parse_tape(&pattern, &PatternContext::default(), &mut rand::thread_rng());
            let steps = spread(&tape.steps, length)?;
            println!("{}", Tape::new(steps));
            Ok(())
        }
    }
}

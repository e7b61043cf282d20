use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tape_lib::{logging, AppConfig, Console, TapeSender};
use tracing::info;

#[derive(Parser)]
#[command(name = "tape")]
#[command(about = "Expand tape notation and send tapes over UDP", long_about = None)]
struct Args {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to send tapes to (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// UDP port to send tapes to (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Seed for reproducible random values (overrides the config file)
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("could not load config {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let ctx = config.pattern_context().context("invalid pattern settings")?;
    let sender = TapeSender::new(&config.host, config.port)
        .with_context(|| format!("could not open transport to {}:{}", config.host, config.port))?
        .with_terminator(config.terminator.clone());
    info!("sending tapes to {}", sender.target());

    let mut console = Console::new(ctx, config.seed).with_sender(sender);
    let stdin = io::stdin();
    console.run(stdin.lock(), io::stdout().lock())?;
    Ok(())
}

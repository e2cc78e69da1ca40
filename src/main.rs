//! Main entry point for the league predictor console
//!
//! Reads one command per line from stdin, keeps the league in memory and
//! prints predictions and rankings as they are requested.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use league_predictor::config::{validate_config, AppConfig};
use league_predictor::console::{OutputFormat, Response, Session, USAGE};
use league_predictor::League;
use tracing::{error, info};

/// League Predictor - scoreline forecasts from recorded match results
#[derive(Parser)]
#[command(
    name = "league-predictor",
    version,
    about = "Fit attack/defence ratings to match results and predict scorelines",
    long_about = "League Predictor reads match results from stdin, fits per-competitor attack and \
                 defence rates with a capped-margin scoring model and answers prediction, stats \
                 and overview queries."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Score cap override
    #[arg(long, value_name = "CAP", help = "Override the score margin that ends a match")]
    score_cap: Option<u32>,

    /// Render output as JSON
    #[arg(long, help = "Render predictions, stats and overviews as JSON")]
    json: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without reading input")]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from file or environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(score_cap) = args.score_cap {
        config.model.score_cap = score_cap;
    }

    validate_config(&config)?;
    Ok(config)
}

fn display_startup_banner(config: &AppConfig) {
    info!("League Predictor {}", league_predictor::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Score cap: {}", config.model.score_cap);
    info!("   Time steps: {}", config.model.time_steps);
    info!("   Max fit rounds: {}", config.fitting.max_rounds);
}

fn run(session: &mut Session) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    writeln!(stdout, "{}", USAGE)?;

    for line in stdin.lock().lines() {
        let line = line?;

        match session.handle_line(&line) {
            Ok(Response::Silent) => {}
            Ok(Response::Text(text)) => writeln!(stdout, "{}", text)?,
            Ok(Response::Exit) => break,
            Err(e) => {
                error!("Command failed: {}", e);
                writeln!(stdout, "{}", e)?;
            }
        }
        stdout.flush()?;
    }

    info!("{} competitors on record", session.league().len());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config);

    if args.dry_run {
        info!("Configuration validation successful");
        return Ok(());
    }

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let mut session = Session::new(
        League::from_config(&config),
        config.prediction.truncation(),
        format,
    )?;

    run(&mut session)
}

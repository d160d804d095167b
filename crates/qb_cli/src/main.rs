//! Quizball CLI
//!
//! Drives the match engine from the command line: serve JSON requests over
//! stdin/stdout, play or simulate matches, and print the effective config.

mod autoplay;

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use qb_core::config::load_from_env;
use qb_core::{dispatch_json, DurationClass, GameConfig, GameService, RuntimeConfig};

use autoplay::{play_match, AutoplayOptions};

#[derive(Parser)]
#[command(name = "quizball")]
#[command(about = "Trivia-gated football match engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Game config JSON (defaults to $QUIZBALL_CONFIG_PATH, then built-in values)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for reproducible matches
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer one JSON request per stdin line with one JSON response per line
    Serve,

    /// Play a single match unattended and print every action
    Play {
        /// tiny, short, regular or long
        #[arg(long, default_value = "regular")]
        duration: DurationClass,

        /// Chance of answering each quiz question correctly (0.0 to 1.0)
        #[arg(long, default_value = "0.7")]
        accuracy: f64,
    },

    /// Play many matches and print aggregate statistics
    Simulate {
        /// Number of matches
        #[arg(long, default_value = "1000")]
        matches: usize,

        /// tiny, short, regular or long
        #[arg(long, default_value = "regular")]
        duration: DurationClass,

        /// Chance of answering each quiz question correctly (0.0 to 1.0)
        #[arg(long, default_value = "0.7")]
        accuracy: f64,
    },

    /// Print the effective configuration
    Config,
}

fn load_config(path: Option<&PathBuf>) -> Result<RuntimeConfig> {
    let base = match path {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => load_from_env().context("Failed to load config from environment")?,
    };
    let config = RuntimeConfig::new(base)?;
    info!(
        source = %path.map_or_else(|| "environment".to_string(), |p| p.display().to_string()),
        overrides = config.overrides().snapshot().len(),
        "Config loaded"
    );
    Ok(config)
}

fn build_service(config: RuntimeConfig, seed: Option<u64>) -> GameService {
    match seed {
        Some(seed) => GameService::with_seed(config, seed),
        None => GameService::new(config),
    }
}

fn check_accuracy(accuracy: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&accuracy) {
        bail!("accuracy must be between 0.0 and 1.0, got {accuracy}");
    }
    Ok(())
}

fn driver_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        // offset so the driver and the engine do not share a stream
        Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn serve(service: &GameService) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut handled = 0usize;
    info!("Serving JSON requests on stdin");
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read request: {}", e);
                return Err(e).context("Failed to read request");
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        writeln!(stdout, "{}", dispatch_json(service, &line))?;
        stdout.flush()?;
        handled += 1;
    }
    info!(handled, matches = service.registry().len(), "Input closed, stopping");
    Ok(())
}

fn simulate(
    service: &GameService,
    matches: usize,
    options: AutoplayOptions,
    seed: Option<u64>,
) -> Result<()> {
    let mut rng = driver_rng(seed);
    let mut max_scores: BTreeMap<u32, usize> = BTreeMap::new();
    let mut reasons: BTreeMap<String, usize> = BTreeMap::new();
    let (mut blue_wins, mut red_wins, mut draws) = (0usize, 0usize, 0usize);
    let mut total_actions = 0u64;

    for _ in 0..matches {
        let end = play_match(service, options, &mut rng)?;
        *max_scores.entry(end.max_score).or_default() += 1;
        let reason = end.over_reason.as_deref().unwrap_or("unknown");
        // group action-budget reasons regardless of the drawn budget
        let bucket = if reason.starts_with("Game ended after") {
            "Action budget reached".to_string()
        } else {
            reason.to_string()
        };
        *reasons.entry(bucket).or_default() += 1;
        total_actions += u64::from(end.total_action_count);
        match end.blue_score.cmp(&end.red_score) {
            std::cmp::Ordering::Greater => blue_wins += 1,
            std::cmp::Ordering::Less => red_wins += 1,
            std::cmp::Ordering::Equal => draws += 1,
        }
    }

    let avg_actions = if matches == 0 { 0.0 } else { total_actions as f64 / matches as f64 };
    let summary = json!({
        "matches": matches,
        "duration": options.duration,
        "accuracy": options.accuracy,
        "blue_wins": blue_wins,
        "red_wins": red_wins,
        "draws": draws,
        "average_total_actions": avg_actions,
        "max_score_distribution": max_scores,
        "end_reasons": reasons,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let service = build_service(config, cli.seed);

    match cli.command {
        Commands::Serve => serve(&service)?,
        Commands::Play { duration, accuracy } => {
            check_accuracy(accuracy)?;
            let mut rng = driver_rng(cli.seed);
            let options = AutoplayOptions { duration, accuracy, verbose: true };
            let end = play_match(&service, options, &mut rng)?;
            println!("{}", serde_json::to_string_pretty(&end)?);
        }
        Commands::Simulate { matches, duration, accuracy } => {
            check_accuracy(accuracy)?;
            let options = AutoplayOptions { duration, accuracy, verbose: false };
            simulate(&service, matches, options, cli.seed)?;
        }
        Commands::Config => {
            let out = json!({
                "public": service.public_probabilities(),
                "duration_settings": service.duration_settings(),
                "max_player_actions": service.registry().max_player_actions(),
                "overrides": service
                    .config()
                    .overrides()
                    .snapshot()
                    .into_iter()
                    .map(|((actor, action), value)| format!("{actor}_{action}={value}"))
                    .collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}

//! Lunar Buggy - terminal entry point

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::Parser;

use lunar_buggy::platform::{TerminalInput, TerminalSession, quit_on_signals};
use lunar_buggy::renderer::TerminalRenderer;
use lunar_buggy::{Config, GameLoop};

/// Drive a moon buggy over pits, cones, flies and steps
#[derive(Debug, Parser)]
#[command(name = "lunar-buggy", version, about)]
struct Cli {
    /// JSON file with game tunables (missing fields keep their defaults)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for the first run (defaults to the clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation and frame rate
    #[arg(long)]
    fps: Option<u32>,

    /// Lives per run
    #[arg(long)]
    lives: Option<u8>,

    /// Write the resolved config as JSON to FILE and exit
    #[arg(long, value_name = "FILE")]
    write_config: Option<PathBuf>,

    /// Write logs here (the screen is taken by the game)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("lunar-buggy: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.log_file.as_deref())?;
    let config = resolve_config(&cli)?;
    if let Some(path) = &cli.write_config {
        config.save(path)?;
        println!("Config written to {}", path.display());
        return Ok(());
    }
    let seed = cli.seed.unwrap_or_else(clock_seed);
    log::info!("Lunar Buggy starting with seed {seed}");

    let quit = quit_on_signals()?;
    let highscores = {
        let session = TerminalSession::enter()?;
        let input = TerminalInput::new(session.enhanced());
        let mut game = GameLoop::new(config, seed, TerminalRenderer::new(), input)?
            .with_shutdown(quit);
        game.run()?;
        game.into_highscores()
    };

    if let Some(best) = highscores.best() {
        println!(
            "Best run: {} (score {} + distance {}, seed {})",
            best.total, best.score, best.distance, best.seed
        );
    }
    Ok(())
}

/// Defaults, then the config file, then command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(fps) = cli.fps {
        config.fps = fps;
    }
    if let Some(lives) = cli.lives {
        config.lives = lives;
    }
    config.validate()?;
    Ok(config)
}

/// Logs go to a file or nowhere; stderr belongs to the game screen
fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::new();
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            builder
                .filter_level(log::LevelFilter::Info)
                .target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.parse_default_env().init();
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED)
}

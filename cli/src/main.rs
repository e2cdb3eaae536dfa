use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tilematch_core::{
    ConfigError, GameSession, Leaderboard, ResultLog, ValidGrid, parse_grid, validate,
};

use settings::{Overrides, Settings};
use store::FileStore;
use terminal::Terminal;

mod settings;
mod store;
mod terminal;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::WarnLevel>,

    /// TOML file with settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a grid definition and list every problem found
    Validate {
        /// Grid definition, instead of the configured one
        path: Option<PathBuf>,
    },
    /// Play the configured grid in the terminal
    Play,
    /// Show the leaderboard
    Leaderboard,
    /// Show every recorded game result
    Results,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.verbose.tracing_level_filter())
        .with_writer(io::stderr)
        .init();

    let mut settings = Settings::load(args.config.as_deref())?;
    settings.apply(&args.overrides);
    log::debug!("{settings:?}");

    match args.command {
        Command::Validate { path } => check(path.as_deref().unwrap_or(&settings.grid)),
        Command::Play => play(&settings),
        Command::Leaderboard => show_leaderboard(&settings),
        Command::Results => show_results(&settings),
    }
}

fn load_grid(path: &Path) -> anyhow::Result<Result<ValidGrid, Vec<ConfigError>>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading grid definition {}", path.display()))?;
    let tiles = parse_grid(&text)
        .with_context(|| format!("reading grid definition {}", path.display()))?;
    Ok(validate(&tiles))
}

fn report(path: &Path, errors: &[ConfigError]) {
    println!("{} is not playable:", path.display());
    for error in errors {
        println!("  {error}");
    }
}

fn check(path: &Path) -> anyhow::Result<ExitCode> {
    match load_grid(path)? {
        Ok(grid) => {
            let (rows, cols) = grid.dimensions();
            println!(
                "{} is playable: {rows}x{cols}, {} pairs",
                path.display(),
                grid.pair_count()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            report(path, &errors);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn play(settings: &Settings) -> anyhow::Result<ExitCode> {
    let grid = match load_grid(&settings.grid)? {
        Ok(grid) => grid,
        Err(errors) => {
            report(&settings.grid, &errors);
            return Ok(ExitCode::FAILURE);
        }
    };

    let store = FileStore::new(&settings.data_dir);
    log::info!("keeping scores in {}", store.dir().display());
    let mut session = GameSession::new(grid, settings.timing(), store);

    let mut terminal = Terminal::new(io::stdin().lock(), io::stdout().lock());
    terminal::run(&mut session, &mut terminal)?;
    Ok(ExitCode::SUCCESS)
}

fn show_leaderboard(settings: &Settings) -> anyhow::Result<ExitCode> {
    let mut store = FileStore::new(&settings.data_dir);
    let board = Leaderboard::load(&mut store);
    for (rank, entry) in board.entries().iter().enumerate() {
        println!("{:>2}. {:<4}{:>6}", rank + 1, entry.player_name, entry.score);
    }
    Ok(ExitCode::SUCCESS)
}

fn show_results(settings: &Settings) -> anyhow::Result<ExitCode> {
    let store = FileStore::new(&settings.data_dir);
    let log = ResultLog::load(&store)?;
    if log.is_empty() {
        println!("No games recorded yet");
    }
    for (n, result) in log.results().iter().enumerate() {
        println!(
            "{:>3}. score {:>6}  {} pairs  {} clicks  {}s",
            n + 1,
            result.score,
            result.pairs_found,
            result.total_clicks,
            result.total_time_seconds
        );
    }
    Ok(ExitCode::SUCCESS)
}

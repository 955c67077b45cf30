//! Command line front end for the food chain game

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use food_chain::{
    board::BoardGenerator,
    config::{CliOverrides, OutputFormat, Settings},
    engine::{Game, Intent},
    new_game,
    scores::{JsonScoreStore, ScoreStore},
    utils::{BoardFormatter, ColorOutput},
};
use rand::SeedableRng;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "food_chain")]
#[command(about = "Turn-based predator and prey game")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game in the terminal
    Play {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Board rows (overrides config)
        #[arg(long)]
        rows: Option<usize>,

        /// Board columns (overrides config)
        #[arg(long)]
        cols: Option<usize>,

        /// Random seed (overrides config)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Player id used for saved scores (overrides config)
        #[arg(short, long)]
        user: Option<String>,

        /// Print JSON snapshots instead of a text board
        #[arg(long)]
        json: bool,
    },

    /// Generate and print a starting board
    Board {
        #[arg(long, default_value_t = 5)]
        rows: usize,

        #[arg(long, default_value_t = 5)]
        cols: usize,

        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// List saved scores for a player
    Scores {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Player id (overrides config)
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Create a default configuration file
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Play {
            config,
            rows,
            cols,
            seed,
            user,
            json,
        } => {
            let overrides = CliOverrides {
                rows,
                cols,
                seed,
                user_id: user,
                format: json.then_some(OutputFormat::Json),
                scores_file: None,
            };
            play_command(config, overrides)
        }
        Commands::Board { rows, cols, seed } => board_command(rows, cols, seed),
        Commands::Scores { config, user } => scores_command(config, user),
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

fn load_settings(config_path: &PathBuf) -> Result<Settings> {
    if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))
    } else {
        Ok(Settings::default())
    }
}

fn play_command(config_path: PathBuf, overrides: CliOverrides) -> Result<()> {
    let mut settings = load_settings(&config_path)?;
    settings.merge_with_cli(&overrides);
    settings
        .validate()
        .context("Configuration validation failed")?;

    let mut game = new_game(&settings).context("Failed to start a new game")?;
    let mut store = JsonScoreStore::new(&settings.output.scores_file);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_session(&mut game, &settings, stdin.lock(), stdout.lock(), &mut store)
}

/// Read commands line by line and render after each one.
/// Saves the score when the player quits or input ends.
fn run_session<R: BufRead, W: Write, S: ScoreStore>(
    game: &mut Game,
    settings: &Settings,
    input: R,
    mut output: W,
    store: &mut S,
) -> Result<()> {
    writeln!(output, "{}", ColorOutput::info("Food Chain"))?;
    writeln!(output, "{}", BoardFormatter::legend())?;
    render(game, settings, &mut output)?;

    for line in input.lines() {
        let line = line.context("Failed to read command")?;
        let command = line.trim();
        if matches!(command, "quit" | "q" | "exit") {
            break;
        }

        match command.parse::<Intent>() {
            Ok(intent) => match game.dispatch(intent) {
                Ok(outcome) => {
                    writeln!(
                        output,
                        "{}",
                        ColorOutput::success(&BoardFormatter::format_outcome(&outcome))
                    )?;
                }
                Err(rejection) => {
                    writeln!(output, "{}", ColorOutput::warning(&rejection.to_string()))?;
                }
            },
            Err(err) => {
                writeln!(output, "{}", ColorOutput::error(&err.to_string()))?;
            }
        }
        render(game, settings, &mut output)?;
    }

    let record = store
        .save_score(&settings.game.user_id, game.score(), game.day())
        .context("Failed to save score")?;
    writeln!(
        output,
        "{}",
        ColorOutput::info(&format!(
            "Saved score {:.2} after {} day(s) for {}",
            record.score, record.day, record.user_id
        ))
    )?;
    if let Some(best) = store.high_score(&settings.game.user_id)? {
        writeln!(output, "High score: {:.2}", best)?;
    }
    Ok(())
}

fn render<W: Write>(game: &Game, settings: &Settings, output: &mut W) -> Result<()> {
    let snapshot = game.snapshot();
    match settings.output.format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string(&snapshot).context("Failed to serialize game snapshot")?;
            writeln!(output, "{}", json)?;
        }
        OutputFormat::Text => {
            writeln!(output)?;
            write!(
                output,
                "{}",
                BoardFormatter::format_grid_with_coords(snapshot.grid, snapshot.active_prey)
            )?;
            write!(
                output,
                "{}",
                BoardFormatter::format_status(&snapshot, settings.game.target_ratio)
            )?;
        }
    }
    Ok(())
}

fn board_command(rows: usize, cols: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => food_chain::board::GameRng::seed_from_u64(seed),
        None => food_chain::board::GameRng::from_entropy(),
    };
    let grid = BoardGenerator::new(rows, cols)
        .generate(&mut rng)
        .context("Failed to generate board")?;

    println!("Board ({}x{}):", grid.rows, grid.cols);
    print!("{}", BoardFormatter::format_grid_with_coords(&grid, None));
    println!("{}", BoardFormatter::legend());
    Ok(())
}

fn scores_command(config_path: PathBuf, user: Option<String>) -> Result<()> {
    let settings = load_settings(&config_path)?;
    let user_id = user.unwrap_or(settings.game.user_id);
    let store = JsonScoreStore::new(&settings.output.scores_file);

    let records = store.load_scores(&user_id)?;
    if records.is_empty() {
        println!("{}", ColorOutput::warning(&format!("No scores for {}", user_id)));
        return Ok(());
    }

    println!("Scores for {}:", user_id);
    println!("ID    | Score  | Day | Recorded");
    println!("------|--------|-----|--------------------");
    for record in &records {
        println!(
            "{:5} | {:6.2} | {:3} | {}",
            record.id,
            record.score,
            record.day,
            record.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    if let Some(best) = store.high_score(&user_id)? {
        println!("{}", ColorOutput::success(&format!("High score: {:.2}", best)));
    }
    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    let config_path = directory.join("config").join("default.yaml");
    if config_path.exists() && !force {
        println!("Skipped: {} (already exists)", config_path.display());
        return Ok(());
    }

    Settings::default()
        .to_file(&config_path)
        .context("Failed to create default configuration")?;
    println!("Created: {}", config_path.display());
    println!("{}", ColorOutput::success("Setup complete!"));
    Ok(())
}

//! CLI commands for whisker-route

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::agent::{GameSetup, TspAgent};
use crate::config::{LogFormat, PlannerConfig};
use crate::game::{simulate, GameStats, RandomGame};
use crate::tsp::SearchStrategy;
use whisker_common::{Error, Weight};

#[derive(Parser, Debug)]
#[command(name = "whisker-route")]
#[command(about = "Exact shortest-route planning to collect every cheese in a maze", long_about = None)]
pub struct Cli {
    /// Planner configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan a route for a game described in JSON and print the plan
    Solve {
        /// Game file: maze, player location and cheese
        #[arg(long)]
        game: PathBuf,

        /// Search strategy (overrides the configuration file)
        #[arg(long, value_enum)]
        strategy: Option<SearchStrategy>,

        /// Warn when preprocessing takes longer than this
        #[arg(long)]
        budget_ms: Option<u64>,
    },

    /// Play one random game and print its statistics
    Play {
        #[arg(long, default_value = "15")]
        width: u32,

        #[arg(long, default_value = "11")]
        height: u32,

        /// Number of cheese pieces
        #[arg(long, default_value = "5")]
        cheese: usize,

        #[arg(long, default_value = "0")]
        seed: u64,

        /// Probability that a passage is muddy
        #[arg(long, default_value = "0.0")]
        mud_density: f64,

        /// Heaviest mud weight
        #[arg(long, default_value = "5")]
        max_mud: Weight,

        #[arg(long, value_enum)]
        strategy: Option<SearchStrategy>,

        /// Stop the game after this many turns
        #[arg(long, default_value = "10000")]
        max_turns: usize,
    },

    /// Plan many random games in parallel and print aggregated results
    Batch {
        #[arg(long, default_value = "15")]
        width: u32,

        #[arg(long, default_value = "11")]
        height: u32,

        #[arg(long, default_value = "5")]
        cheese: usize,

        /// Number of games; game i uses seed + i
        #[arg(long, default_value = "100")]
        games: usize,

        #[arg(long, default_value = "0")]
        seed: u64,

        #[arg(long, default_value = "0.0")]
        mud_density: f64,

        #[arg(long, default_value = "5")]
        max_mud: Weight,

        #[arg(long, value_enum)]
        strategy: Option<SearchStrategy>,

        /// Number of worker threads (0 = rayon default)
        #[arg(short, long, default_value = "0")]
        threads: usize,
    },
}

impl Cli {
    /// Configuration file contents, or defaults when no file was given
    pub fn load_config(&self) -> Result<PlannerConfig> {
        match &self.config {
            Some(path) => PlannerConfig::from_toml_file(path)
                .with_context(|| format!("loading configuration from {}", path.display())),
            None => Ok(PlannerConfig::default()),
        }
    }

    pub fn log_format(&self, config: &PlannerConfig) -> LogFormat {
        if self.json_logs {
            LogFormat::Json
        } else {
            config.log_format
        }
    }
}

/// True when `err` wraps a planner error that points at a bug rather than bad input
pub fn is_fatal(err: &anyhow::Error) -> bool {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .is_some_and(Error::is_fatal)
}

#[derive(Debug, Serialize)]
struct PlayReport {
    seed: u64,
    player_location: u32,
    cheese: Vec<u32>,
    route_length: Weight,
    moves: usize,
    preprocessing_ms: f64,
    game: GameStats,
}

#[derive(Debug, Serialize)]
struct BatchReport {
    games: usize,
    strategy: SearchStrategy,
    total_length: Weight,
    min_length: Weight,
    max_length: Weight,
    mean_length: f64,
    total_search_calls: u64,
    elapsed_ms: f64,
}

pub fn run(cli: Cli, mut config: PlannerConfig) -> Result<()> {
    match cli.command {
        Commands::Solve {
            game,
            strategy,
            budget_ms,
        } => {
            config.strategy = strategy.unwrap_or(config.strategy);
            config.preprocessing_budget_ms = budget_ms.or(config.preprocessing_budget_ms);
            solve(&game, config)
        }
        Commands::Play {
            width,
            height,
            cheese,
            seed,
            mud_density,
            max_mud,
            strategy,
            max_turns,
        } => {
            config.strategy = strategy.unwrap_or(config.strategy);
            let game = RandomGame::new(width, height, cheese, seed).with_mud(mud_density, max_mud);
            play(game, config, max_turns)
        }
        Commands::Batch {
            width,
            height,
            cheese,
            games,
            seed,
            mud_density,
            max_mud,
            strategy,
            threads,
        } => {
            config.strategy = strategy.unwrap_or(config.strategy);
            if threads > 0 {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build_global()
                    .context("configuring the rayon thread pool")?;
            }
            let game = RandomGame::new(width, height, cheese, seed).with_mud(mud_density, max_mud);
            batch(game, games, config)
        }
    }
}

fn solve(path: &Path, config: PlannerConfig) -> Result<()> {
    let setup = GameSetup::load_json(path)
        .with_context(|| format!("reading game from {}", path.display()))?;
    let mut agent = TspAgent::new(config);
    tracing::info!(
        width = setup.maze.width(),
        height = setup.maze.height(),
        cheese = setup.cheese.len(),
        strategy = ?agent.config().strategy,
        "planning"
    );

    let plan = agent.preprocess(&setup).context("preprocessing failed")?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn play(game: RandomGame, config: PlannerConfig, max_turns: usize) -> Result<()> {
    let setup = game.generate().context("generating game")?;

    let mut agent = TspAgent::new(config);
    let start = Instant::now();
    let plan = agent.preprocess(&setup).context("preprocessing failed")?;
    let preprocessing_ms = start.elapsed().as_secs_f64() * 1000.0;

    let stats = simulate(&setup, &mut agent, max_turns).context("game aborted")?;
    agent.postprocess(&stats);
    let report = PlayReport {
        seed: game.seed,
        player_location: setup.player_location,
        cheese: setup.cheese.clone(),
        route_length: plan.length,
        moves: plan.actions.len(),
        preprocessing_ms,
        game: stats,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn batch(game: RandomGame, games: usize, config: PlannerConfig) -> Result<()> {
    if games == 0 {
        anyhow::bail!("--games must be at least 1");
    }
    let start = Instant::now();

    let plans = (0..games)
        .into_par_iter()
        .map(|i| {
            let seed = game.seed.wrapping_add(i as u64);
            let setup = RandomGame { seed, ..game }
                .generate()
                .with_context(|| format!("generating game with seed {seed}"))?;
            let mut agent = TspAgent::new(config.clone());
            agent
                .preprocess(&setup)
                .with_context(|| format!("planning game with seed {seed}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let lengths: Vec<Weight> = plans.iter().map(|plan| plan.length).collect();
    let total_length: Weight = lengths.iter().sum();
    let report = BatchReport {
        games,
        strategy: config.strategy,
        total_length,
        min_length: lengths.iter().copied().min().unwrap_or(0),
        max_length: lengths.iter().copied().max().unwrap_or(0),
        mean_length: total_length as f64 / games as f64,
        total_search_calls: plans.iter().map(|plan| plan.stats.calls).sum(),
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    };
    tracing::info!(games, elapsed_ms = report.elapsed_ms, "batch complete");
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_solve() {
        let cli = Cli::try_parse_from([
            "whisker-route",
            "solve",
            "--game",
            "game.json",
            "--strategy",
            "exhaustive",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Solve { game, strategy, .. } => {
                assert_eq!(game, PathBuf::from("game.json"));
                assert_eq!(strategy, Some(SearchStrategy::Exhaustive));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_json_logs_override_config() {
        let cli = Cli::try_parse_from(["whisker-route", "--json-logs", "play"]).unwrap();
        assert_eq!(cli.log_format(&PlannerConfig::default()), LogFormat::Json);

        let cli = Cli::try_parse_from(["whisker-route", "play"]).unwrap();
        let config = PlannerConfig {
            log_format: LogFormat::Json,
            ..PlannerConfig::default()
        };
        assert_eq!(cli.log_format(&config), LogFormat::Json);
        assert_eq!(cli.log_format(&PlannerConfig::default()), LogFormat::Pretty);
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let cli = Cli::try_parse_from([
            "whisker-route",
            "play",
            "--config",
            "/nonexistent/planner.toml",
        ])
        .unwrap();
        let err = cli.load_config().unwrap_err();
        assert!(format!("{err:#}").contains("planner.toml"));
    }

    #[test]
    fn test_fatal_errors_are_recognised_through_context() {
        let exhausted: Result<()> = Err(Error::ActionQueueExhausted { turn: 4 }.into());
        let err = exhausted.context("game aborted").unwrap_err();
        assert!(is_fatal(&err));

        let unreachable: Result<()> = Err(Error::Unreachable { from: 0, to: 2 }.into());
        let err = unreachable.context("preprocessing failed").unwrap_err();
        assert!(!is_fatal(&err));
        assert!(!is_fatal(&anyhow::anyhow!("unrelated")));
    }

    #[test]
    fn test_solve_reads_game_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        std::fs::write(
            &path,
            r#"{"maze": {"width": 2, "height": 1, "edges": [[0, 1, 1]]}, "player_location": 0, "cheese": [1]}"#,
        )
        .unwrap();
        solve(&path, PlannerConfig::default()).unwrap();
        assert!(solve(&dir.path().join("missing.json"), PlannerConfig::default()).is_err());
    }

    #[test]
    fn test_play_and_batch_run() {
        let config = PlannerConfig::default();
        play(RandomGame::new(5, 5, 4, 1), config.clone(), 1000).unwrap();
        batch(RandomGame::new(4, 4, 3, 7).with_mud(0.2, 3), 8, config.clone()).unwrap();
        assert!(batch(RandomGame::new(4, 4, 3, 7), 0, config).is_err());
    }
}

//! Train command - Train a Q-learning agent on a treasure hunt

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;

use super::Demo;
use crate::{
    adapters::CsvRepository,
    cli::output::{format_number, policy_arrows, print_section, print_stats_table},
    config::{ConfigFile, QConfig, QuitMode},
    envs::{GridMap, GridWorld, LineWorld},
    pipeline::{JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver},
    ports::Environment,
    q_learning::{Trainer, TrainingReport, ValueTable, build_rng},
};

#[derive(Parser, Debug)]
#[command(about = "Train a Q-learning agent")]
pub struct TrainArgs {
    /// Which treasure hunt to train on
    #[arg(long, value_enum, default_value_t = Demo::Grid)]
    pub demo: Demo,

    /// Stopping rule (overrides the config file)
    #[arg(long, value_enum)]
    pub mode: Option<QuitMode>,

    /// Episodes in rounds mode (overrides the config file)
    #[arg(long, short = 'r')]
    pub rounds: Option<usize>,

    /// Resume from the stored value table (and the stored map for the grid demo)
    #[arg(long)]
    pub load: bool,

    /// Display every transition while training
    #[arg(long)]
    pub show: bool,

    /// Use the heuristic-augmented action selector
    #[arg(long)]
    pub heuristic: bool,

    /// YAML configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Value table checkpoint
    #[arg(long, default_value = "q_table.csv")]
    pub table: PathBuf,

    /// Convergence trace checkpoint
    #[arg(long, default_value = "convergence.csv")]
    pub trace: PathBuf,

    /// Grid map file, written when a new map is generated
    #[arg(long, default_value = "map.csv")]
    pub map: PathBuf,

    /// Side length of a generated grid, or position of the line treasure
    #[arg(long)]
    pub size: Option<usize>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Optional file for per-episode JSONL observations
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile {
    demo: Demo,
    report: TrainingReport,
    metrics: MetricsSummary,
    config: QConfig,
}

/// Merge the config file with command-line overrides.
fn resolve_config(args: &TrainArgs) -> Result<ConfigFile> {
    let mut file = match &args.config {
        Some(path) => ConfigFile::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ConfigFile::default(),
    };

    if let Some(mode) = args.mode {
        file.q.quit_mode = mode;
    }
    if let Some(rounds) = args.rounds {
        file.q.train_rounds = rounds;
    }
    if let Some(seed) = args.seed {
        file.q.seed = Some(seed);
    }
    if args.heuristic {
        file.q.heuristic = true;
    }
    if args.show {
        file.q.display = true;
    }
    if let Some(size) = args.size {
        file.grid.size = size;
        file.line.size = size;
    }

    file.q.validate()?;
    file.grid.validate()?;
    file.line.validate()?;
    Ok(file)
}

/// Stored map when resuming, otherwise a fresh map written to `--map` before
/// any checkpoint refers to it.
fn grid_map(args: &TrainArgs, file: &ConfigFile) -> Result<GridMap> {
    if args.load {
        return GridMap::load(&args.map)
            .with_context(|| format!("Failed to load map {}", args.map.display()));
    }
    let mut rng = build_rng(file.q.seed);
    let map = GridMap::generate(file.grid.size, &mut rng)?;
    map.save(&args.map)
        .with_context(|| format!("Failed to save map {}", args.map.display()))?;
    Ok(map)
}

fn train_env<E: Environment>(
    env: E,
    config: &QConfig,
    args: &TrainArgs,
) -> Result<(TrainingReport, MetricsSummary, E, ValueTable)> {
    let repository = CsvRepository::new(&args.table, &args.trace);
    let metrics = MetricsObserver::new();

    let mut trainer = Trainer::new(env, config.clone(), Box::new(repository))?
        .with_observer(Box::new(metrics.clone()));
    if args.progress {
        trainer = trainer.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("Failed to create observations file {}", path.display()))?;
        trainer = trainer.with_observer(Box::new(observer));
    }

    if args.load {
        trainer.load_checkpoint().with_context(|| {
            format!("Failed to load value table {}", args.table.display())
        })?;
    }

    let report = trainer.train()?;
    let (env, table) = trainer.into_parts();
    Ok((report, metrics.summary(), env, table))
}

fn write_summary(path: &Path, summary: &TrainingSummaryFile) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create summary {}", path.display()))?;
    to_writer_pretty(file, summary)?;
    Ok(())
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let file = resolve_config(&args)?;
    let config = file.q.clone();

    print_section(&format!("Training {:?} treasure hunt", args.demo));
    let (report, metrics) = match args.demo {
        Demo::Line => {
            let env = LineWorld::from_config(&file.line)?;
            let (report, metrics, _, _) = train_env(env, &config, &args)?;
            (report, metrics)
        }
        Demo::Grid => {
            let map = grid_map(&args, &file)?;
            let env = GridWorld::new(map, file.grid.clone())?;
            let (report, metrics, env, table) = train_env(env, &config, &args)?;
            println!("\nGreedy policy:");
            print!("{}", policy_arrows(&env, &table));
            (report, metrics)
        }
    };

    print_stats_table(&[
        ("Mode", report.mode.to_string()),
        ("Episodes", format_number(report.episodes)),
        ("Converged", report.converged.to_string()),
        ("Final metric", format!("{:.6}", report.final_metric)),
        ("Mean reward", format!("{:.3}", metrics.mean_reward)),
        ("Mean steps", format!("{:.1}", metrics.mean_steps)),
        ("Table", args.table.display().to_string()),
        ("Trace", args.trace.display().to_string()),
    ]);

    if let Some(path) = &args.summary {
        write_summary(
            path,
            &TrainingSummaryFile {
                demo: args.demo,
                report,
                metrics,
                config,
            },
        )?;
        println!("\nSummary written to {}", path.display());
    }

    Ok(())
}

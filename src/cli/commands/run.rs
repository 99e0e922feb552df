//! Run command - Replay the greedy policy of a trained value table

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use super::Demo;
use crate::{
    cli::output::{print_section, print_stats_table},
    config::ConfigFile,
    envs::{GridMap, GridWorld, LineWorld},
    ports::Environment,
    q_learning::{ValueTable, deploy},
};

#[derive(Parser, Debug)]
#[command(about = "Walk the greedy policy of a trained table")]
pub struct RunArgs {
    /// Which treasure hunt to play
    #[arg(long, value_enum, default_value_t = Demo::Grid)]
    pub demo: Demo,

    /// Trained value table
    #[arg(long, default_value = "q_table.csv")]
    pub table: PathBuf,

    /// Grid map the table was trained on
    #[arg(long, default_value = "map.csv")]
    pub map: PathBuf,

    /// Position of the line treasure (must match training)
    #[arg(long)]
    pub size: Option<usize>,

    /// YAML configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Give up after this many moves
    #[arg(long, default_value_t = 1000)]
    pub max_steps: usize,

    /// Display every move
    #[arg(long)]
    pub show: bool,
}

fn replay<E: Environment>(mut env: E, args: &RunArgs) -> Result<()> {
    let rows = env.states().len();
    let cols = env.actions().len();
    let table = ValueTable::load(&args.table, rows, cols)
        .with_context(|| format!("Failed to load value table {}", args.table.display()))?;

    let walk = deploy::walk(&mut env, &table, args.max_steps, args.show)?;
    print_stats_table(&[
        ("Steps", walk.steps().to_string()),
        ("Total reward", format!("{:.3}", walk.total_reward)),
        ("Final state", format!("{:?}", walk.final_state())),
    ]);
    Ok(())
}

pub fn execute(args: RunArgs) -> Result<()> {
    let mut file = match &args.config {
        Some(path) => ConfigFile::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ConfigFile::default(),
    };
    if let Some(size) = args.size {
        file.line.size = size;
    }

    print_section(&format!("Running {:?} treasure hunt", args.demo));
    match args.demo {
        Demo::Line => replay(LineWorld::from_config(&file.line)?, &args),
        Demo::Grid => {
            let map = GridMap::load(&args.map)
                .with_context(|| format!("Failed to load map {}", args.map.display()))?;
            replay(GridWorld::new(map, file.grid)?, &args)
        }
    }
}

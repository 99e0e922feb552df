use rand::{SeedableRng, rngs::StdRng};
use tempfile::tempdir;
use treasure_hunt::{
    Error,
    adapters::{CsvRepository, InMemoryRepository},
    config::{QConfig, QuitMode},
    envs::{Cell, GridConfig, GridMap, GridWorld, LineWorld},
    pipeline::MetricsObserver,
    ports::Environment,
    q_learning::{ConvergenceTracker, Trainer, ValueTable, alpha_linear, deploy},
    types::{ActionId, StateId},
};

/// One decision with a single legal move worth 10.
struct OneShot;

impl Environment for OneShot {
    type State = u8;
    type Action = &'static str;

    fn states(&self) -> Vec<u8> {
        vec![0, 1]
    }

    fn actions(&self) -> Vec<&'static str> {
        vec!["stay", "go"]
    }

    fn available_actions(&self, _state: &u8) -> Vec<&'static str> {
        vec!["go"]
    }

    fn reward(&self, _state: &u8, _action: &&'static str) -> f64 {
        10.0
    }

    fn transition(&mut self, _state: &u8, _action: &&'static str) -> u8 {
        1
    }

    fn init(&mut self) {}

    fn start_state(&self) -> u8 {
        0
    }

    fn terminal_states(&self) -> Vec<u8> {
        vec![1]
    }
}

fn open_grid() -> GridMap {
    use Cell::*;
    #[rustfmt::skip]
    let cells = vec![
        Path, Path, Path, Path,
        Path, Wall, Trap, Path,
        Path, Path, Path, Path,
        Trap, Path, Path, Treasure,
    ];
    GridMap::new(4, cells).unwrap()
}

#[test]
fn rounds_mode_runs_exactly_requested_episodes() {
    let repo = InMemoryRepository::new();
    let metrics = MetricsObserver::new();
    let config = QConfig::default().with_train_rounds(7).with_seed(1);

    let mut trainer = Trainer::new(LineWorld::new(4, 1.0).unwrap(), config, Box::new(repo.clone()))
        .unwrap()
        .with_observer(Box::new(metrics.clone()));
    let report = trainer.train().unwrap();

    assert_eq!(report.mode, QuitMode::Rounds);
    assert_eq!(report.episodes, 7);
    assert_eq!(report.trace_len, 8);
    assert_eq!(trainer.trace()[0], 0.0);
    assert_eq!(repo.table_saves(), 7);
    assert_eq!(repo.trace_saves(), 7);
    assert_eq!(repo.trace().len(), 8);
    assert_eq!(repo.table().as_ref(), Some(trainer.value_table()));

    let episodes = metrics.episodes();
    assert_eq!(episodes.len(), 7);
    assert!(episodes.iter().all(|e| e.total_reward == 1.0));
    assert_eq!(metrics.report(), Some(report));
}

#[test]
fn convergence_mode_fails_at_iteration_limit() {
    let repo = InMemoryRepository::new();
    let config = QConfig::default()
        .with_quit_mode(QuitMode::Convergence)
        .with_maximum_iteration(3)
        .with_phi(1e-12)
        .with_seed(5);

    let mut trainer =
        Trainer::new(LineWorld::new(4, 1.0).unwrap(), config, Box::new(repo.clone())).unwrap();
    let result = trainer.train();

    assert!(matches!(
        result,
        Err(Error::IterationLimitExceeded { limit: 3 })
    ));
    // the third episode ran but was neither recorded nor checkpointed
    assert_eq!(trainer.trace().len(), 3);
    assert_eq!(repo.table_saves(), 2);
}

#[test]
fn convergence_mode_stops_once_metric_settles() {
    let repo = InMemoryRepository::new();
    let config = QConfig::default()
        .with_quit_mode(QuitMode::Convergence)
        .with_phi(0.5)
        .with_seed(9);

    let mut trainer = Trainer::new(OneShot, config, Box::new(repo.clone())).unwrap();
    let report = trainer.train().unwrap();

    assert!(report.converged);
    assert!(report.episodes >= 2);
    assert_eq!(report.trace_len, report.episodes + 1);
    assert_eq!(repo.table_saves(), report.episodes);

    let trace = trainer.trace();
    let n = trace.len();
    let delta = trace[n - 1] - trace[n - 2];
    assert!((0.0..0.5).contains(&delta));
}

#[test]
fn single_forced_move_learns_scaled_reward() {
    let config = QConfig::default().with_train_rounds(1).with_alpha(0.1);
    let mut trainer = Trainer::new(OneShot, config, Box::new(InMemoryRepository::new())).unwrap();
    trainer.train().unwrap();

    let q = trainer.value_table();
    let expected = alpha_linear(0.1, 0) * 10.0;
    assert!((q.get(StateId::new(0), ActionId::new(1)) - expected).abs() < 1e-12);
    assert_eq!(q.get(StateId::new(0), ActionId::new(0)), 0.0);
}

#[test]
fn csv_checkpoints_resume_training() {
    let dir = tempdir().unwrap();
    let table = dir.path().join("q.csv");
    let trace = dir.path().join("conv.csv");

    let config = QConfig::default().with_train_rounds(20).with_seed(3);
    let mut first = Trainer::new(
        LineWorld::new(5, 1.0).unwrap(),
        config.clone(),
        Box::new(CsvRepository::new(&table, &trace)),
    )
    .unwrap();
    first.train().unwrap();
    let learned = first.value_table().clone();

    assert_eq!(ValueTable::load(&table, 6, 2).unwrap(), learned);
    let stored_trace = ConvergenceTracker::load_trace(&trace).unwrap();
    assert_eq!(stored_trace.len(), 21);
    assert_eq!(stored_trace.as_slice(), first.trace());

    let mut resumed = Trainer::new(
        LineWorld::new(5, 1.0).unwrap(),
        config,
        Box::new(CsvRepository::new(&table, &trace)),
    )
    .unwrap();
    resumed.load_checkpoint().unwrap();
    assert_eq!(resumed.value_table(), &learned);
}

#[test]
fn loading_missing_checkpoint_fails() {
    let dir = tempdir().unwrap();
    let repo = CsvRepository::new(dir.path().join("absent.csv"), dir.path().join("conv.csv"));
    let mut trainer =
        Trainer::new(LineWorld::new(3, 1.0).unwrap(), QConfig::default(), Box::new(repo)).unwrap();
    assert!(matches!(
        trainer.load_checkpoint(),
        Err(Error::StorageNotFound { .. })
    ));
}

#[test]
fn line_world_policy_walks_to_treasure() {
    let config = QConfig::default().with_train_rounds(500).with_seed(11);
    let mut trainer = Trainer::new(
        LineWorld::new(3, 1.0).unwrap(),
        config,
        Box::new(InMemoryRepository::new()),
    )
    .unwrap();
    trainer.train().unwrap();
    let (mut env, table) = trainer.into_parts();

    let walk = deploy::walk(&mut env, &table, 50, false).unwrap();
    assert_eq!(walk.path, vec![0, 1, 2, 3]);
    assert_eq!(walk.total_reward, 1.0);
}

#[test]
fn grid_training_checkpoints_every_episode() {
    let repo = InMemoryRepository::new();
    let world = GridWorld::new(open_grid(), GridConfig::default()).unwrap();
    let config = QConfig::default().with_train_rounds(15).with_seed(21);

    let mut trainer = Trainer::new(world, config, Box::new(repo.clone()))
        .unwrap()
        .with_rng(StdRng::seed_from_u64(21));
    let report = trainer.train().unwrap();

    assert_eq!(report.episodes, 15);
    assert_eq!(repo.table_saves(), 15);
    let table = repo.table().unwrap();
    assert_eq!((table.rows(), table.cols()), (16, 4));
    // the wall cell is never entered, so its row is untouched
    assert!(table.row(StateId::new(5)).iter().all(|&v| v == 0.0));
}

#[test]
fn heuristic_training_completes() {
    let world = GridWorld::new(open_grid(), GridConfig::default()).unwrap();
    let config = QConfig::default()
        .with_heuristic(0.9, 0.9)
        .with_train_rounds(10)
        .with_seed(2);

    let mut trainer = Trainer::new(world, config, Box::new(InMemoryRepository::new())).unwrap();
    let report = trainer.train().unwrap();
    assert_eq!(report.episodes, 10);
}

//! Episodic Q-learning training loop

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    Error, Result,
    config::{QConfig, QuitMode},
    pipeline::pacing::{NoPacer, Pacer, SleepPacer},
    ports::{CheckpointRepository, Environment, Observer},
    q_learning::{
        convergence::ConvergenceTracker, heuristic::HeuristicTable, policy,
        q_table::ValueTable, schedule::AlphaSchedule,
    },
    types::{ActionId, Space, StateId},
};

/// Per-episode record handed to observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Episode index (0-based)
    pub episode: usize,
    /// Transitions taken
    pub steps: usize,
    /// Undiscounted sum of rewards
    pub total_reward: f64,
    /// Summed change of the value table since the start of the run
    pub metric: f64,
    /// Result of the convergence test for this episode
    pub converged: bool,
    /// Learning rate used during the episode
    pub alpha: f64,
}

/// Outcome of a completed training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub mode: QuitMode,
    /// Episodes completed
    pub episodes: usize,
    /// Whether the last convergence test passed (informational in rounds mode)
    pub converged: bool,
    /// Last convergence trace entry
    pub final_metric: f64,
    /// Length of the convergence trace, sentinel included
    pub trace_len: usize,
}

/// Seeded generator when `seed` is set, otherwise seeded from the thread RNG
pub fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Visit counters for the running episode
#[derive(Debug, Clone)]
struct VisitCounts {
    cols: usize,
    counts: Vec<u32>,
}

impl VisitCounts {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            counts: vec![0; rows * cols],
        }
    }

    fn reset(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
    }

    fn bump(&mut self, state: StateId, action: ActionId) {
        self.counts[state.index() * self.cols + action.index()] += 1;
    }

    fn get(&self, state: StateId, action: ActionId) -> u32 {
        self.counts[state.index() * self.cols + action.index()]
    }
}

/// Tabular Q-learning trainer over an [`Environment`].
///
/// Owns the value table, the heuristic table, and the convergence trace for
/// the whole run. Observers and the environment's display hook only ever see
/// read-only data.
///
/// # Examples
///
/// ```no_run
/// use treasure_hunt::{
///     adapters::CsvRepository,
///     config::QConfig,
///     envs::LineWorld,
///     q_learning::Trainer,
/// };
///
/// let env = LineWorld::new(6, 1.0)?;
/// let repo = CsvRepository::new("q.csv", "conv.csv");
/// let mut trainer = Trainer::new(env, QConfig::default().with_seed(7), Box::new(repo))?;
/// let report = trainer.train()?;
/// println!("trained for {} episodes", report.episodes);
/// # Ok::<(), treasure_hunt::Error>(())
/// ```
pub struct Trainer<E: Environment> {
    env: E,
    config: QConfig,
    states: Space<E::State>,
    actions: Space<E::Action>,
    start: StateId,
    terminal: Vec<bool>,
    q: ValueTable,
    h: HeuristicTable,
    visits: VisitCounts,
    tracker: ConvergenceTracker,
    schedule: AlphaSchedule,
    rng: StdRng,
    repository: Box<dyn CheckpointRepository>,
    observers: Vec<Box<dyn Observer>>,
    pacer: Box<dyn Pacer>,
}

impl<E: Environment> Trainer<E> {
    /// Create a trainer with a zero-initialized value table.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfiguration`] for bad parameters, out-of-range
    ///   start/terminal indices, or an environment without terminal states
    /// - [`Error::DuplicateLabel`] if the environment repeats a state or action
    /// - [`Error::UnknownState`] if the environment's start or terminal
    ///   states are not in its state set
    pub fn new(
        env: E,
        config: QConfig,
        repository: Box<dyn CheckpointRepository>,
    ) -> Result<Self> {
        config.validate()?;

        let states = Space::new(env.states())?;
        let actions = Space::new(env.actions())?;

        let resolve = |index: isize| {
            states
                .resolve_signed(index)
                .map(StateId::new)
                .ok_or_else(|| Error::InvalidConfiguration {
                    message: format!(
                        "state index {index} out of range for {} states",
                        states.len()
                    ),
                })
        };

        let start = match config.start_index {
            Some(index) => resolve(index)?,
            None => states.state_id(&env.start_state())?,
        };

        let terminal_ids: Vec<StateId> = match &config.terminal_indices {
            Some(indices) => indices.iter().map(|&i| resolve(i)).collect::<Result<_>>()?,
            None => env
                .terminal_states()
                .iter()
                .map(|state| states.state_id(state))
                .collect::<Result<_>>()?,
        };
        if terminal_ids.is_empty() {
            return Err(Error::InvalidConfiguration {
                message: "environment defines no terminal states".to_string(),
            });
        }
        let mut terminal = vec![false; states.len()];
        for id in terminal_ids {
            terminal[id.index()] = true;
        }

        let (rows, cols) = (states.len(), actions.len());
        let pacer: Box<dyn Pacer> = if config.display && config.sleep_ms > 0 {
            Box::new(SleepPacer::from_millis(config.sleep_ms))
        } else {
            Box::new(NoPacer)
        };

        Ok(Self {
            env,
            states,
            actions,
            start,
            terminal,
            q: ValueTable::zeros(rows, cols),
            h: HeuristicTable::zeros(rows, cols),
            visits: VisitCounts::new(rows, cols),
            tracker: ConvergenceTracker::new(config.phi),
            schedule: AlphaSchedule::linear(config.alpha),
            rng: build_rng(config.seed),
            repository,
            observers: Vec::new(),
            pacer,
            config,
        })
    }

    /// Add an observer
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Replace the display pacer
    pub fn with_pacer(mut self, pacer: Box<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// Replace the learning-rate schedule (default: harmonic with `alpha`)
    pub fn with_schedule(mut self, schedule: AlphaSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Replace the random generator
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Replace the value table with the repository's checkpoint.
    ///
    /// # Errors
    ///
    /// [`Error::StorageNotFound`] when nothing is stored, or a shape error
    /// when the stored table does not match the state/action sets.
    pub fn load_checkpoint(&mut self) -> Result<()> {
        self.q = self
            .repository
            .load_table(self.states.len(), self.actions.len())?;
        info!(
            states = self.states.len(),
            actions = self.actions.len(),
            "loaded value table checkpoint"
        );
        Ok(())
    }

    pub fn config(&self) -> &QConfig {
        &self.config
    }

    pub fn value_table(&self) -> &ValueTable {
        &self.q
    }

    pub fn heuristic_table(&self) -> &HeuristicTable {
        &self.h
    }

    pub fn trace(&self) -> &[f64] {
        self.tracker.trace()
    }

    pub fn states(&self) -> &Space<E::State> {
        &self.states
    }

    pub fn actions(&self) -> &Space<E::Action> {
        &self.actions
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    pub fn start_state(&self) -> StateId {
        self.start
    }

    pub fn is_terminal(&self, state: StateId) -> bool {
        self.terminal[state.index()]
    }

    /// Visits of a state-action pair during the latest episode
    pub fn visit_count(&self, state: StateId, action: ActionId) -> u32 {
        self.visits.get(state, action)
    }

    /// Give back the environment and the learned table
    pub fn into_parts(self) -> (E, ValueTable) {
        (self.env, self.q)
    }

    /// Run episodes until the configured stopping rule fires.
    ///
    /// The value table and the convergence trace are checkpointed after
    /// every episode.
    ///
    /// # Errors
    ///
    /// - [`Error::IterationLimitExceeded`] in convergence mode when the
    ///   episode count reaches `maximum_iteration` without converging
    /// - [`Error::NoActionsAvailable`] if a non-terminal state offers no action
    /// - Storage and observer errors, unchanged
    pub fn train(&mut self) -> Result<TrainingReport> {
        let mode = self.config.quit_mode;
        let budget = match mode {
            QuitMode::Rounds => self.config.train_rounds,
            QuitMode::Convergence => self.config.maximum_iteration,
        };

        self.h.reset();
        self.tracker = ConvergenceTracker::new(self.config.phi);
        let initial = self.q.clone();

        for observer in &mut self.observers {
            observer.on_training_start(mode, budget)?;
        }
        info!(%mode, budget, heuristic = self.config.heuristic, "training started");

        let mut episodes = 0;
        let mut converged;
        loop {
            for observer in &mut self.observers {
                observer.on_episode_start(episodes)?;
            }

            let alpha = self.schedule.rate(episodes);
            let (steps, total_reward) = self.run_episode(alpha)?;
            let episode = episodes;
            episodes += 1;

            let stop = match mode {
                QuitMode::Rounds => {
                    converged = self.tracker.record(self.q.delta_sum(&initial));
                    episodes == self.config.train_rounds
                }
                QuitMode::Convergence => {
                    if episodes >= self.config.maximum_iteration {
                        warn!(
                            limit = self.config.maximum_iteration,
                            "training stopped without converging"
                        );
                        return Err(Error::IterationLimitExceeded {
                            limit: self.config.maximum_iteration,
                        });
                    }
                    converged = self.tracker.record(self.q.delta_sum(&initial));
                    converged
                }
            };

            self.repository.save_table(&self.q)?;
            self.repository.save_trace(self.tracker.trace())?;

            let summary = EpisodeSummary {
                episode,
                steps,
                total_reward,
                metric: self.tracker.last(),
                converged,
                alpha,
            };
            debug!(
                episode,
                steps,
                total_reward,
                metric = summary.metric,
                converged,
                "episode finished"
            );
            for observer in &mut self.observers {
                observer.on_episode_end(&summary)?;
            }

            if stop {
                break;
            }
        }

        let report = TrainingReport {
            mode,
            episodes,
            converged,
            final_metric: self.tracker.last(),
            trace_len: self.tracker.trace().len(),
        };
        info!(
            episodes,
            converged,
            final_metric = report.final_metric,
            "training finished"
        );
        for observer in &mut self.observers {
            observer.on_training_end(&report)?;
        }
        Ok(report)
    }

    /// One episode from the start state; returns (steps, total reward).
    fn run_episode(&mut self, alpha: f64) -> Result<(usize, f64)> {
        self.env.init();
        self.visits.reset();

        let mut state = self.start;
        self.show(state, false);

        let mut steps = 0;
        let mut total_reward = 0.0;
        loop {
            let action = self.select(state)?;
            let q_predict = self.q.get(state, action);

            let state_label = self.states.labels()[state.index()].clone();
            let action_label = self.actions.labels()[action.index()].clone();
            let reward = self.env.reward(&state_label, &action_label);
            let next_label = self.env.transition(&state_label, &action_label);
            let next = self.states.state_id(&next_label)?;

            self.visits.bump(state, action);

            let done = self.terminal[next.index()];
            let target = if done {
                reward
            } else {
                reward + self.config.gamma * self.q.row_max(next)
            };

            self.h.update(&self.q, state, action, self.config.eta);
            self.q.add(state, action, alpha * (target - q_predict));

            state = next;
            steps += 1;
            total_reward += reward;
            self.show(state, true);

            if done || self.env.is_episode_over(&next_label) {
                return Ok((steps, total_reward));
            }
        }
    }

    fn select(&mut self, state: StateId) -> Result<ActionId> {
        let label = &self.states.labels()[state.index()];
        let available = self
            .env
            .available_actions(label)
            .iter()
            .map(|action| self.actions.action_id(action))
            .collect::<Result<Vec<_>>>()?;

        let chosen = if self.config.heuristic {
            policy::choose_heuristic(
                &self.q,
                &self.h,
                state,
                &available,
                self.config.iota,
                self.config.epsilon,
                &mut self.rng,
            )
        } else {
            policy::choose(
                &self.q,
                state,
                &available,
                self.config.epsilon,
                &mut self.rng,
            )
        };

        chosen.ok_or_else(|| Error::NoActionsAvailable {
            state: format!("{label:?}"),
        })
    }

    fn show(&mut self, state: StateId, pause: bool) {
        if !self.config.display {
            return;
        }
        self.env.display(&self.states.labels()[state.index()]);
        if pause {
            self.pacer.pause();
        }
    }
}

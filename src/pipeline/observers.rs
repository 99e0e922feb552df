//! Observer implementations for training runs
//!
//! Observers collect data during training without coupling the training loop
//! to any output format.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    config::QuitMode,
    ports::Observer,
    q_learning::{EpisodeSummary, TrainingReport},
};

/// Progress bar observer - Shows training progress
///
/// In convergence mode the bar length is the iteration ceiling, so a run
/// that converges early finishes short of the end.
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    total_reward: f64,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            total_reward: 0.0,
        }
    }

    fn message(&self, summary: &EpisodeSummary) -> String {
        format!(
            "reward {:.2} metric {:.4} steps {}",
            summary.total_reward, summary.metric, summary.steps
        )
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, mode: QuitMode, budget: usize) -> Result<()> {
        let pb = ProgressBar::new(budget as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "[{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos}}/{{len}} episodes ({mode}) {{msg}}"
                ))
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.total_reward += summary.total_reward;
        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.episode as u64 + 1);
            pb.set_message(self.message(summary));
        }
        Ok(())
    }

    fn on_training_end(&mut self, report: &TrainingReport) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            let status = if report.converged {
                "converged"
            } else {
                "done"
            };
            pb.finish_with_message(format!(
                "{status} after {} episodes (total reward {:.2})",
                report.episodes, self.total_reward
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Collected {
    episodes: Vec<EpisodeSummary>,
    report: Option<TrainingReport>,
}

/// Metrics observer - Records every episode summary
///
/// Clones share the same storage, so a caller can keep one handle and give
/// the other to the trainer.
#[derive(Debug, Clone, Default)]
pub struct MetricsObserver {
    collected: Arc<Mutex<Collected>>,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Collected> {
        self.collected
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Episode summaries recorded so far
    pub fn episodes(&self) -> Vec<EpisodeSummary> {
        self.lock().episodes.clone()
    }

    /// Final report, once training has completed
    pub fn report(&self) -> Option<TrainingReport> {
        self.lock().report.clone()
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        let collected = self.lock();
        let episodes = &collected.episodes;
        let count = episodes.len();
        let mean = |f: fn(&EpisodeSummary) -> f64| {
            if count == 0 {
                0.0
            } else {
                episodes.iter().map(f).sum::<f64>() / count as f64
            }
        };
        MetricsSummary {
            episodes: count,
            mean_reward: mean(|e| e.total_reward),
            mean_steps: mean(|e| e.steps as f64),
            best_reward: episodes
                .iter()
                .map(|e| e.total_reward)
                .fold(None, |best: Option<f64>, r| Some(best.map_or(r, |b| b.max(r)))),
            last_metric: episodes.last().map(|e| e.metric),
            converged: collected.report.as_ref().is_some_and(|r| r.converged),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub mean_reward: f64,
    pub mean_steps: f64,
    pub best_reward: Option<f64>,
    pub last_metric: Option<f64>,
    pub converged: bool,
}

impl Observer for MetricsObserver {
    fn on_training_start(&mut self, _mode: QuitMode, _budget: usize) -> Result<()> {
        let mut collected = self.lock();
        collected.episodes.clear();
        collected.report = None;
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.lock().episodes.push(summary.clone());
        Ok(())
    }

    fn on_training_end(&mut self, report: &TrainingReport) -> Result<()> {
        self.lock().report = Some(report.clone());
        Ok(())
    }
}

/// JSONL observer - Exports one JSON object per episode
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create observations file {}", path.display()),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        serde_json::to_writer(&mut self.writer, summary)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self, _report: &TrainingReport) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for JsonlObserver {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn summary(episode: usize, total_reward: f64, steps: usize) -> EpisodeSummary {
        EpisodeSummary {
            episode,
            steps,
            total_reward,
            metric: total_reward / 10.0,
            converged: false,
            alpha: 0.1,
        }
    }

    #[test]
    fn test_metrics_observer_shares_storage() {
        let handle = MetricsObserver::new();
        let mut observer: Box<dyn Observer> = Box::new(handle.clone());
        observer.on_training_start(QuitMode::Rounds, 2).unwrap();
        observer.on_episode_end(&summary(0, 1.0, 4)).unwrap();
        observer.on_episode_end(&summary(1, 3.0, 2)).unwrap();

        let metrics = handle.summary();
        assert_eq!(metrics.episodes, 2);
        assert_eq!(metrics.mean_reward, 2.0);
        assert_eq!(metrics.mean_steps, 3.0);
        assert_eq!(metrics.best_reward, Some(3.0));
        assert_eq!(metrics.last_metric, Some(0.3));
        assert!(!metrics.converged);
        assert!(handle.report().is_none());
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = MetricsObserver::new().summary();
        assert_eq!(metrics.episodes, 0);
        assert_eq!(metrics.mean_reward, 0.0);
        assert_eq!(metrics.best_reward, None);
    }

    #[test]
    fn test_jsonl_observer_writes_one_line_per_episode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("episodes.jsonl");
        {
            let mut observer = JsonlObserver::new(&path).unwrap();
            observer.on_episode_end(&summary(0, -1.5, 3)).unwrap();
            observer.on_episode_end(&summary(1, 10.0, 7)).unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: EpisodeSummary = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.episode, 1);
        assert_eq!(parsed.steps, 7);
    }

    #[test]
    fn test_progress_observer_lifecycle() {
        let mut observer = ProgressObserver::new();
        observer.on_training_start(QuitMode::Convergence, 10).unwrap();
        observer.on_episode_end(&summary(0, 2.0, 1)).unwrap();
        observer
            .on_training_end(&TrainingReport {
                mode: QuitMode::Convergence,
                episodes: 1,
                converged: true,
                final_metric: 0.2,
                trace_len: 2,
            })
            .unwrap();
        assert_eq!(observer.total_reward, 2.0);
    }
}

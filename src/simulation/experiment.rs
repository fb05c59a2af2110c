//! Alternating training and evaluation
use super::Checkpointer;
use crate::agents::{ActorMode, AgentStats, EpisodicAgent};
use crate::error::RLError;
use crate::logging::StatsLogger;
use crate::utils::stats::OnlineMean;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Configuration for [`run_experiment`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Total number of training episodes.
    pub training_episodes: u64,
    /// Evaluate after every `eval_period` training episodes.
    pub eval_period: u64,
    /// Number of episodes in each evaluation phase.
    pub eval_episodes: u64,
    /// Maximum number of steps per episode.
    pub max_steps: u64,
    /// Save a checkpoint when the evaluation average return reaches this value.
    pub threshold_return: f64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            training_episodes: 500,
            eval_period: 50,
            eval_episodes: 100,
            max_steps: 500,
            threshold_return: 495.0,
        }
    }
}

impl ExperimentConfig {
    /// Check that the configuration describes a runnable experiment.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.eval_period == 0 {
            Err(ConfigError::ZeroEvalPeriod)
        } else if self.eval_episodes == 0 {
            Err(ConfigError::ZeroEvalEpisodes)
        } else if self.max_steps == 0 {
            Err(ConfigError::ZeroMaxSteps)
        } else {
            Ok(())
        }
    }
}

/// Invalid [`ExperimentConfig`]
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConfigError {
    #[error("evaluation period must be at least 1 episode")]
    ZeroEvalPeriod,
    #[error("each evaluation must run at least 1 episode")]
    ZeroEvalEpisodes,
    #[error("episodes must allow at least 1 step")]
    ZeroMaxSteps,
}

/// Result of one evaluation phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalRecord {
    /// Number of training episodes completed.
    pub episode: u64,
    /// Number of training steps completed.
    pub total_steps: u64,
    /// Average return over all training episodes so far.
    pub train_average_return: f64,
    /// Number of evaluation episodes run in this phase.
    pub eval_episodes: u64,
    /// Average return over this phase's evaluation episodes.
    pub eval_average_return: f64,
    /// Whole seconds since the start of the experiment.
    pub elapsed_secs: u64,
    pub agent_stats: AgentStats,
    /// Path of the checkpoint saved after this evaluation, if any.
    pub checkpoint: Option<PathBuf>,
}

/// Summary of a completed experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub train_episodes: u64,
    pub train_steps: u64,
    pub train_average_return: f64,
    pub evaluations: Vec<EvalRecord>,
}

/// Train an agent, periodically evaluating it and saving checkpoints.
///
/// Every training episode logs `Train/AverageReturns` and `Train/EpisodeReturns`
/// at the episode number.
/// After every `eval_period` training episodes, `eval_episodes` evaluation episodes are run,
/// each logging `Eval/AverageReturns` and `Eval/EpisodeReturns` at the current training episode
/// number, and a progress summary is printed to standard output.
/// If `checkpointer` is set, the agent weights are then saved whenever the evaluation average
/// return is at least `threshold_return`. A failed save ends the experiment with an error
/// after that evaluation has been printed and the logger flushed.
pub fn run_experiment<A, L>(
    agent: &mut A,
    config: &ExperimentConfig,
    logger: &mut L,
    checkpointer: Option<&Checkpointer>,
) -> Result<ExperimentSummary, RLError>
where
    A: EpisodicAgent + ?Sized,
    L: StatsLogger + ?Sized,
{
    config.validate()?;
    let start = Instant::now();
    let mut train_steps = 0;
    let mut train_returns = OnlineMean::new();
    let mut evaluations = Vec::new();

    for episode in 1..=config.training_episodes {
        agent.set_mode(ActorMode::Training);
        let outcome = agent.run(config.max_steps);
        train_steps += outcome.steps;
        train_returns.push(outcome.episode_return);
        let train_average_return = train_returns.mean().unwrap_or(0.0);
        logger.log_scalar("Train/AverageReturns", episode, train_average_return);
        logger.log_scalar("Train/EpisodeReturns", episode, outcome.episode_return);

        if episode % config.eval_period != 0 {
            continue;
        }

        agent.set_mode(ActorMode::Evaluation);
        let mut eval_returns = OnlineMean::new();
        for _ in 0..config.eval_episodes {
            let outcome = agent.run(config.max_steps);
            eval_returns.push(outcome.episode_return);
            let eval_average_return = eval_returns.mean().unwrap_or(0.0);
            logger.log_scalar("Eval/AverageReturns", episode, eval_average_return);
            logger.log_scalar("Eval/EpisodeReturns", episode, outcome.episode_return);
        }
        let eval_average_return = eval_returns.mean().unwrap_or(0.0);
        let elapsed_secs = start.elapsed().as_secs();

        let mut record = EvalRecord {
            episode,
            total_steps: train_steps,
            train_average_return,
            eval_episodes: eval_returns.count(),
            eval_average_return,
            elapsed_secs,
            agent_stats: agent.stats(),
            checkpoint: None,
        };
        println!("{}", record);
        logger.flush();

        if let Some(checkpointer) = checkpointer {
            if eval_average_return >= config.threshold_return {
                record.checkpoint = Some(checkpointer.save(
                    &*agent,
                    episode,
                    eval_average_return,
                    elapsed_secs,
                )?);
            }
        }
        evaluations.push(record);
    }
    logger.flush();

    Ok(ExperimentSummary {
        train_episodes: train_returns.count(),
        train_steps,
        train_average_return: train_returns.mean().unwrap_or(0.0),
        evaluations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::SaveWeightsError;
    use crate::logging::testing::RecordingLogger;
    use crate::simulation::EpisodeOutcome;
    use rstest::rstest;
    use std::fs;
    use std::io;
    use std::path::Path;

    /// Episodic agent with scripted returns.
    ///
    /// Training episode `k` (1-based) lasts `k` steps with return `k`.
    /// Evaluation episodes cycle through `eval_returns`.
    #[derive(Debug)]
    struct ScriptedAgent {
        mode: ActorMode,
        train_count: u64,
        eval_count: usize,
        eval_returns: Vec<f64>,
        modes: Vec<ActorMode>,
        fail_save: bool,
    }

    impl ScriptedAgent {
        fn new(eval_returns: Vec<f64>) -> Self {
            Self {
                mode: ActorMode::Training,
                train_count: 0,
                eval_count: 0,
                eval_returns,
                modes: Vec::new(),
                fail_save: false,
            }
        }
    }

    impl EpisodicAgent for ScriptedAgent {
        #[allow(clippy::cast_precision_loss)]
        fn run(&mut self, max_steps: u64) -> EpisodeOutcome {
            self.modes.push(self.mode);
            match self.mode {
                ActorMode::Training => {
                    self.train_count += 1;
                    let steps = self.train_count.min(max_steps);
                    EpisodeOutcome {
                        steps,
                        episode_return: steps as f64,
                    }
                }
                ActorMode::Evaluation => {
                    let episode_return = self.eval_returns[self.eval_count % self.eval_returns.len()];
                    self.eval_count += 1;
                    EpisodeOutcome {
                        steps: 1,
                        episode_return,
                    }
                }
            }
        }

        fn set_mode(&mut self, mode: ActorMode) {
            self.mode = mode;
        }

        fn mode(&self) -> ActorMode {
            self.mode
        }

        fn stats(&self) -> AgentStats {
            let mut stats = AgentStats::new();
            stats.insert("LossQ", 0.5);
            stats
        }

        fn save_weights(&self, path: &Path) -> Result<(), SaveWeightsError> {
            if self.fail_save {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full").into());
            }
            fs::write(path, b"weights")?;
            Ok(())
        }
    }

    const fn config(training_episodes: u64, eval_period: u64, eval_episodes: u64) -> ExperimentConfig {
        ExperimentConfig {
            training_episodes,
            eval_period,
            eval_episodes,
            max_steps: 500,
            threshold_return: 495.0,
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(ExperimentConfig::default().validate(), Ok(()));
    }

    #[rstest]
    #[case(config(10, 0, 5), ConfigError::ZeroEvalPeriod)]
    #[case(config(10, 5, 0), ConfigError::ZeroEvalEpisodes)]
    #[case(ExperimentConfig { max_steps: 0, ..config(10, 5, 5) }, ConfigError::ZeroMaxSteps)]
    fn invalid_config_rejected(#[case] config: ExperimentConfig, #[case] expected: ConfigError) {
        assert_eq!(config.validate(), Err(expected));
        let mut agent = ScriptedAgent::new(vec![0.0]);
        let result = run_experiment(&mut agent, &config, &mut (), None);
        assert!(matches!(result, Err(RLError::Config(e)) if e == expected));
        assert!(agent.modes.is_empty());
    }

    #[test]
    fn evaluation_cadence_and_modes() {
        let mut agent = ScriptedAgent::new(vec![10.0]);
        let summary = run_experiment(&mut agent, &config(5, 2, 3), &mut (), None).unwrap();

        use ActorMode::{Evaluation as E, Training as T};
        assert_eq!(agent.modes, vec![T, T, E, E, E, T, T, E, E, E, T]);
        let eval_episodes: Vec<_> = summary.evaluations.iter().map(|r| r.episode).collect();
        assert_eq!(eval_episodes, vec![2, 4]);
    }

    #[test]
    fn train_scalars_logged_per_episode() {
        let mut agent = ScriptedAgent::new(vec![10.0]);
        let mut logger = RecordingLogger::default();
        run_experiment(&mut agent, &config(4, 10, 1), &mut logger, None).unwrap();

        assert_eq!(
            logger.series("Train/EpisodeReturns"),
            vec![(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0)]
        );
        assert_eq!(
            logger.series("Train/AverageReturns"),
            vec![(1, 1.0), (2, 1.5), (3, 2.0), (4, 2.5)]
        );
        assert!(logger.series("Eval/AverageReturns").is_empty());
        assert!(logger.flushes > 0);
    }

    #[test]
    fn eval_scalars_logged_at_training_episode() {
        let mut agent = ScriptedAgent::new(vec![100.0, 200.0, 300.0]);
        let mut logger = RecordingLogger::default();
        let summary = run_experiment(&mut agent, &config(6, 3, 3), &mut logger, None).unwrap();

        assert_eq!(
            logger.series("Eval/EpisodeReturns"),
            vec![
                (3, 100.0),
                (3, 200.0),
                (3, 300.0),
                (6, 100.0),
                (6, 200.0),
                (6, 300.0)
            ]
        );
        assert_eq!(
            logger.series("Eval/AverageReturns"),
            vec![
                (3, 100.0),
                (3, 150.0),
                (3, 200.0),
                (6, 100.0),
                (6, 150.0),
                (6, 200.0)
            ]
        );
        let record = &summary.evaluations[1];
        assert_eq!(record.eval_episodes, 3);
        assert!((record.eval_average_return - 200.0).abs() < 1e-9);
        assert_eq!(record.agent_stats.get("LossQ"), Some(0.5));
    }

    #[test]
    fn summary_accumulates_training() {
        let mut agent = ScriptedAgent::new(vec![0.0]);
        let summary = run_experiment(&mut agent, &config(4, 2, 1), &mut (), None).unwrap();
        assert_eq!(summary.train_episodes, 4);
        assert_eq!(summary.train_steps, 10);
        assert!((summary.train_average_return - 2.5).abs() < 1e-9);

        let first = &summary.evaluations[0];
        assert_eq!(first.total_steps, 3);
        assert!((first.train_average_return - 1.5).abs() < 1e-9);
    }

    #[test]
    fn checkpoint_saved_when_threshold_met() {
        let dir = tempfile::tempdir().unwrap();
        let checkpointer = Checkpointer::for_run(dir.path(), "CartPole-v1", "dqn");
        let mut agent = ScriptedAgent::new(vec![495.0, 500.0]);
        let summary =
            run_experiment(&mut agent, &config(4, 2, 2), &mut (), Some(&checkpointer)).unwrap();

        for record in &summary.evaluations {
            let path = record.checkpoint.as_ref().expect("checkpoint saved");
            assert!(path.exists());
            assert_eq!(path.parent(), Some(checkpointer.dir()));
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with(&format!("_ep_{}_rt_497.5_t_", record.episode)));
            assert!(name.ends_with(".pt"));
        }
        assert_eq!(fs::read_dir(checkpointer.dir()).unwrap().count(), 2);
    }

    #[test]
    fn no_checkpoint_below_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let checkpointer = Checkpointer::new(dir.path().join("ckpt"));
        let mut agent = ScriptedAgent::new(vec![494.99]);
        let summary =
            run_experiment(&mut agent, &config(4, 2, 2), &mut (), Some(&checkpointer)).unwrap();

        assert!(summary.evaluations.iter().all(|r| r.checkpoint.is_none()));
        assert!(!checkpointer.dir().exists());
    }

    #[test]
    fn no_checkpoint_without_checkpointer() {
        let mut agent = ScriptedAgent::new(vec![500.0]);
        let summary = run_experiment(&mut agent, &config(2, 1, 1), &mut (), None).unwrap();
        assert_eq!(summary.evaluations.len(), 2);
        assert!(summary.evaluations.iter().all(|r| r.checkpoint.is_none()));
    }

    #[test]
    fn failed_save_after_evaluation_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let checkpointer = Checkpointer::new(dir.path());
        let mut agent = ScriptedAgent {
            fail_save: true,
            ..ScriptedAgent::new(vec![500.0])
        };
        let mut logger = RecordingLogger::default();
        let result = run_experiment(&mut agent, &config(4, 2, 1), &mut logger, Some(&checkpointer));

        assert!(matches!(result, Err(RLError::Checkpoint(_))));
        // The first evaluation completes and is flushed before the save is attempted.
        assert_eq!(logger.series("Eval/AverageReturns"), vec![(2, 500.0)]);
        assert_eq!(logger.flushes, 1);
        assert_eq!(agent.train_count, 2);
    }
}

//! Command-line options
use super::agent::Algorithm;
use crate::simulation::ExperimentConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, PartialEq)]
#[clap(
    version,
    author,
    about = "Train and evaluate reinforcement learning agents on CartPole-v1"
)]
pub struct Options {
    #[clap(long, arg_enum, default_value = "dqn")]
    /// Training algorithm
    pub algo: Algorithm,

    #[clap(long, default_value_t = 0)]
    /// Random seed
    pub seed: u64,

    #[clap(long, default_value_t = 500)]
    /// Number of training episodes
    pub training_eps: u64,

    #[clap(long, default_value_t = 50)]
    /// Evaluate after this many training episodes
    pub eval_per_train: u64,

    #[clap(long, default_value_t = 100)]
    /// Number of episodes in each evaluation
    pub evaluation_eps: u64,

    #[clap(long, default_value_t = 500)]
    /// Maximum number of steps per episode
    pub max_step: u64,

    #[clap(long, default_value_t = 495.0)]
    /// Save the model when the evaluation average return reaches this value
    pub threshold_return: f64,

    #[clap(long, default_value = "runs", help_heading = Some("OUTPUT OPTIONS"))]
    /// Root directory for tensorboard logs
    pub log_dir: PathBuf,

    #[clap(long, default_value = "./tests/save_model", help_heading = Some("OUTPUT OPTIONS"))]
    /// Root directory for saved models
    pub save_dir: PathBuf,

    #[clap(long)]
    /// Use CUDA if available
    pub cuda: bool,
}

impl From<&Options> for ExperimentConfig {
    fn from(opts: &Options) -> Self {
        Self {
            training_episodes: opts.training_eps,
            eval_period: opts.eval_per_train,
            eval_episodes: opts.evaluation_eps,
            max_steps: opts.max_step,
            threshold_return: opts.threshold_return,
        }
    }
}

//! Command-line interface
mod agent;
mod options;

pub use agent::{AgentConfig, Algorithm};
pub use options::Options;

use crate::envs::CartPole;
use crate::error::RLError;
use crate::simulation::ExperimentConfig;
use chrono::{DateTime, Local};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Log directory for a run started at `start`.
///
/// `<log_dir>/CartPole-v1/<algo>/<seed>_<%Y-%m-%d_%H-%M-%S>`
#[must_use]
pub fn run_log_dir(opts: &Options, start: DateTime<Local>) -> PathBuf {
    let mut dir = opts.log_dir.join(CartPole::NAME).join(opts.algo.name());
    dir.push(format!("{}_{}", opts.seed, start.format("%Y-%m-%d_%H-%M-%S")));
    dir
}

/// Full configuration of a run, as saved alongside its logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub env_name: String,
    pub algorithm: Algorithm,
    pub seed: u64,
    pub experiment: ExperimentConfig,
    pub agent: AgentConfig,
}

impl RunConfig {
    pub fn new(env_name: &str, opts: &Options) -> Self {
        Self {
            env_name: env_name.into(),
            algorithm: opts.algo,
            seed: opts.seed,
            experiment: opts.into(),
            agent: opts.into(),
        }
    }

    /// Write as pretty JSON to `<dir>/config.json`, creating `dir` if needed.
    ///
    /// Returns the path of the written file.
    pub fn save_to_dir(&self, dir: &Path) -> Result<PathBuf, RLError> {
        fs::create_dir_all(dir)?;
        let path = dir.join("config.json");
        info!("saving run config to {}", path.display());
        serde_json::to_writer_pretty(File::create(&path)?, self)?;
        Ok(path)
    }
}

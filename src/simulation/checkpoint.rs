//! Saving agent weights
use crate::agents::{EpisodicAgent, SaveWeightsError};
use crate::utils::fmt::Rounded;
use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Saves agent weights into a checkpoint directory.
///
/// File names record the training episode count, the evaluation average return,
/// and the elapsed seconds: `_ep_<episodes>_rt_<return>_t_<seconds>.pt`
/// where the return is rounded to 2 decimal places and keeps at least one (`500.0`, `9.5`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpointer {
    dir: PathBuf,
}

impl Checkpointer {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Checkpointer for `<save_root>/<env_name>/<algorithm>`.
    pub fn for_run<P: AsRef<Path>>(save_root: P, env_name: &str, algorithm: &str) -> Self {
        Self::new(save_root.as_ref().join(env_name).join(algorithm))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The checkpoint file path for an evaluation result.
    #[must_use]
    pub fn path_for(&self, episodes: u64, eval_average_return: f64, elapsed_secs: u64) -> PathBuf {
        self.dir.join(format!(
            "_ep_{}_rt_{}_t_{}.pt",
            episodes,
            Rounded::new(eval_average_return, 2),
            elapsed_secs
        ))
    }

    /// Save the agent weights, creating the checkpoint directory if needed.
    ///
    /// Returns the path of the saved file.
    pub fn save<A>(
        &self,
        agent: &A,
        episodes: u64,
        eval_average_return: f64,
        elapsed_secs: u64,
    ) -> Result<PathBuf, CheckpointError>
    where
        A: EpisodicAgent + ?Sized,
    {
        fs::create_dir_all(&self.dir).map_err(|source| CheckpointError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(episodes, eval_average_return, elapsed_secs);
        agent
            .save_weights(&path)
            .map_err(|source| CheckpointError::Save {
                path: path.clone(),
                source,
            })?;
        info!("saved checkpoint {}", path.display());
        Ok(path)
    }
}

/// Error saving a checkpoint
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("failed to create checkpoint directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to save weights to {}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: SaveWeightsError,
    },
}

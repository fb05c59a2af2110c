//! Error type
use crate::agents::BuildAgentError;
use crate::simulation::{CheckpointError, ConfigError};
use thiserror::Error;

/// Error from a training run.
#[derive(Error, Debug)]
pub enum RLError {
    #[error("error building agent")]
    BuildAgent(#[from] BuildAgentError),
    #[error("invalid experiment configuration")]
    Config(#[from] ConfigError),
    #[error("error saving checkpoint")]
    Checkpoint(#[from] CheckpointError),
    #[error("io error")]
    Io(#[from] std::io::Error),
    #[error("error writing run configuration")]
    Json(#[from] serde_json::Error),
}

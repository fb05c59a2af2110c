//! Simulating agent-environment interaction
mod checkpoint;
mod episodes;
mod experiment;

pub use checkpoint::{CheckpointError, Checkpointer};
pub use episodes::{EpisodeOutcome, EpisodeRunner};
pub use experiment::{run_experiment, ConfigError, EvalRecord, ExperimentConfig, ExperimentSummary};

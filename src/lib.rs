//! Training and evaluation runs of reinforcement learning agents on Cart-Pole.
#![warn(clippy::cast_lossless)]
#![warn(clippy::cast_possible_truncation)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::missing_const_for_fn)] // has some false positives
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::use_self)] // also triggered by macro expansions
pub mod agents;
pub mod cli;
pub mod envs;
mod error;
pub mod logging;
pub mod simulation;
pub mod torch;
pub mod utils;

pub use agents::{ActorMode, Agent, AgentStats, BuildAgent, EpisodicAgent, Step};
pub use envs::{CartPole, EnvStructure, Environment, Successor};
pub use error::RLError;
pub use simulation::{run_experiment, EpisodeOutcome, EpisodeRunner, ExperimentConfig};

/// Pseudo-random number generator type used by agents and environments.
pub type Prng = rand_chacha::ChaCha8Rng;

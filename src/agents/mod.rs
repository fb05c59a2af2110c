//! Reinforcement learning agents
//!
//! More agents can be found in [`crate::torch::agents`].
pub mod buffers;
pub mod schedules;

pub use buffers::{ReplayBuffer, Transition};
pub use schedules::ExplorationRateSchedule;

use crate::envs::{EnvStructure, Successor};
use crate::simulation::EpisodeOutcome;
use crate::utils::fmt::Rounded;
use crate::Prng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tch::TchError;
use thiserror::Error;

/// Description of an environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<O, A> {
    /// The initial observation.
    pub observation: O,
    /// The action taken from the initial state given the initial observation.
    pub action: A,
    /// The resulting reward.
    pub reward: f64,
    /// The next observation or outcome; how the episode progresses.
    pub next: Successor<O>,
}

/// Behaviour mode of an agent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorMode {
    /// Training mode: the agent explores and learns from its experience.
    Training,
    /// Evaluation mode: the agent acts greedily and makes no updates.
    Evaluation,
}

impl Default for ActorMode {
    fn default() -> Self {
        Self::Training
    }
}

/// A learning agent that selects actions one step at a time.
pub trait Agent<O, A> {
    /// Choose an action in the environment.
    ///
    /// This must be called sequentially within an episode.
    fn act(&mut self, observation: &O, mode: ActorMode, rng: &mut Prng) -> A;

    /// Update the agent from the step that followed the most recent call to [`Agent::act`].
    ///
    /// Only called in [`ActorMode::Training`].
    fn update(&mut self, step: Step<O, A>);

    /// Summary statistics about the agent's learning so far.
    fn stats(&self) -> AgentStats;

    /// Save the weights that define the agent's policy.
    fn save_weights(&self, path: &Path) -> Result<(), SaveWeightsError>;
}

/// An agent that runs whole episodes in an environment it owns.
///
/// This is the interface used by [`run_experiment`](crate::simulation::run_experiment).
pub trait EpisodicAgent {
    /// Run one episode of at most `max_steps` steps.
    fn run(&mut self, max_steps: u64) -> EpisodeOutcome;

    /// Set the behaviour mode for subsequent episodes.
    fn set_mode(&mut self, mode: ActorMode);

    /// The current behaviour mode.
    fn mode(&self) -> ActorMode;

    /// Summary statistics about the agent's learning so far.
    fn stats(&self) -> AgentStats;

    /// Save the weights that define the agent's policy.
    fn save_weights(&self, path: &Path) -> Result<(), SaveWeightsError>;
}

impl<T: EpisodicAgent + ?Sized> EpisodicAgent for Box<T> {
    fn run(&mut self, max_steps: u64) -> EpisodeOutcome {
        T::run(self, max_steps)
    }
    fn set_mode(&mut self, mode: ActorMode) {
        T::set_mode(self, mode)
    }
    fn mode(&self) -> ActorMode {
        T::mode(self)
    }
    fn stats(&self) -> AgentStats {
        T::stats(self)
    }
    fn save_weights(&self, path: &Path) -> Result<(), SaveWeightsError> {
        T::save_weights(self, path)
    }
}

/// Build an agent for an environment structure.
pub trait BuildAgent {
    type Agent;

    /// Build a new agent.
    ///
    /// # Args
    /// * `env` - The structure of the environment in which the agent is to operate.
    /// * `rng` - Used for seeding the agent's pseudo-random internal parameters.
    fn build_agent(
        &self,
        env: &dyn EnvStructure,
        rng: &mut Prng,
    ) -> Result<Self::Agent, BuildAgentError>;
}

/// Error building an agent
#[derive(Error, Debug)]
pub enum BuildAgentError {
    #[error("environment has no actions")]
    NoActions,
    #[error("environment has no observation features")]
    NoFeatures,
    #[error(transparent)]
    Torch(#[from] TchError),
}

/// Error saving agent weights
#[derive(Error, Debug)]
pub enum SaveWeightsError {
    #[error(transparent)]
    Torch(#[from] TchError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Named scalar statistics reported by an agent.
///
/// Displays like `{LossPi: -0.01234, LossV: 0.5}` with values rounded to 5 decimal places.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStats(BTreeMap<String, f64>);

impl AgentStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a named value, replacing any existing value.
    pub fn insert<S: Into<String>>(&mut self, name: S, value: f64) {
        self.0.insert(name.into(), value);
    }

    /// Set a named value if it is `Some`.
    pub fn insert_some<S: Into<String>>(&mut self, name: S, value: Option<f64>) {
        if let Some(value) = value {
            self.insert(name, value)
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AgentStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, Rounded::new(value, 5))?;
        }
        write!(f, "}}")
    }
}

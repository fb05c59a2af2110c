//! Running whole episodes
use crate::agents::{ActorMode, Agent, AgentStats, EpisodicAgent, SaveWeightsError, Step};
use crate::envs::{Environment, Successor};
use crate::Prng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Summary of a single episode.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    /// Number of environment steps taken.
    pub steps: u64,
    /// Undiscounted sum of rewards.
    pub episode_return: f64,
}

/// An agent paired with the environment it acts in.
///
/// Runs complete episodes, updating the agent after each step in [`ActorMode::Training`].
/// An episode ends when the environment terminates or when the step limit is reached.
/// Reaching the step limit interrupts the episode without marking the final state terminal.
#[derive(Debug)]
pub struct EpisodeRunner<E, T> {
    env: E,
    agent: T,
    rng: Prng,
    mode: ActorMode,
}

impl<E, T> EpisodeRunner<E, T> {
    /// Create a runner in training mode.
    pub const fn new(env: E, agent: T, rng: Prng) -> Self {
        Self {
            env,
            agent,
            rng,
            mode: ActorMode::Training,
        }
    }

    pub const fn agent(&self) -> &T {
        &self.agent
    }
}

impl<E, T> EpisodicAgent for EpisodeRunner<E, T>
where
    E: Environment,
    E::Observation: Clone,
    T: Agent<E::Observation, E::Action>,
{
    fn run(&mut self, max_steps: u64) -> EpisodeOutcome {
        let env = &self.env;
        let rng = &mut self.rng;
        let mut outcome = EpisodeOutcome::default();

        let mut state = env.initial_state(rng);
        let mut observation = env.observe(&state, rng);
        while outcome.steps < max_steps {
            let action = self.agent.act(&observation, self.mode, rng);
            let (mut successor, reward) = env.step(state, &action, rng);
            outcome.steps += 1;
            outcome.episode_return += reward;
            if outcome.steps >= max_steps {
                successor = successor.interrupt();
            }

            let next = successor.as_ref().map(|s| env.observe(s, rng));
            if self.mode == ActorMode::Training {
                self.agent.update(Step {
                    observation,
                    action,
                    reward,
                    next: next.clone(),
                });
            }
            match (successor, next) {
                (Successor::Continue(s), Successor::Continue(o)) => {
                    state = s;
                    observation = o;
                }
                _ => break,
            }
        }
        outcome
    }

    fn set_mode(&mut self, mode: ActorMode) {
        self.mode = mode;
    }

    fn mode(&self) -> ActorMode {
        self.mode
    }

    fn stats(&self) -> AgentStats {
        self.agent.stats()
    }

    fn save_weights(&self, path: &Path) -> Result<(), SaveWeightsError> {
        self.agent.save_weights(path)
    }
}

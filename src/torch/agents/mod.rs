//! Torch agents
mod actor_critic;
mod dqn;

pub use actor_critic::{ActorCriticAgent, ActorCriticConfig};
pub use dqn::{DqnAgent, DqnConfig, DqnTarget};

use crate::envs::Features;
use tch::{Device, Tensor};

/// Observation feature vector as a 1D float tensor on `device`.
fn feature_tensor<O: Features>(observation: &O, device: Device) -> Tensor {
    Tensor::of_slice(&observation.features()).to_device(device)
}

/// Number of features and actions of an environment as tensor dimensions.
#[allow(clippy::cast_possible_wrap)]
const fn as_dim(size: usize) -> i64 {
    size as i64
}

#[cfg(test)]
mod testing {
    //! Agent testing utilities
    use crate::agents::{ActorMode, Agent, EpisodicAgent};
    use crate::envs::{CartPole, Environment};
    use crate::simulation::EpisodeRunner;
    use crate::Prng;
    use rand::SeedableRng;

    /// Run a few episodes in each mode and check the outcomes are consistent.
    pub fn run_cartpole_episodes<T>(agent: T, max_steps: u64)
    where
        T: Agent<<CartPole as Environment>::Observation, <CartPole as Environment>::Action>,
    {
        let mut runner = EpisodeRunner::new(CartPole::default(), agent, Prng::seed_from_u64(0));
        for mode in [ActorMode::Training, ActorMode::Evaluation] {
            runner.set_mode(mode);
            for _ in 0..3 {
                let outcome = runner.run(max_steps);
                assert!(outcome.steps >= 1);
                assert!(outcome.steps <= max_steps);
                #[allow(clippy::cast_precision_loss)]
                let expected_return = outcome.steps as f64;
                assert!((outcome.episode_return - expected_return).abs() < 1e-9);
            }
        }
    }
}

//! Agent selection
use super::Options;
use crate::agents::{BuildAgent, BuildAgentError, EpisodicAgent};
use crate::envs::{CartPole, EnvStructure};
use crate::simulation::EpisodeRunner;
use crate::torch::agents::{ActorCriticConfig, DqnConfig, DqnTarget};
use crate::Prng;
use clap::ArgEnum;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use tch::Device;

/// Training algorithm
#[derive(ArgEnum, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Deep Q-Network
    Dqn,
    /// Double Deep Q-Network
    Ddqn,
    /// Advantage Actor-Critic
    A2c,
}

impl Algorithm {
    /// Short lowercase name, as used on the command line and in output paths.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dqn => "dqn",
            Self::Ddqn => "ddqn",
            Self::A2c => "a2c",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Agent configuration selected by the command-line options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AgentConfig {
    Dqn(DqnConfig),
    ActorCritic(ActorCriticConfig),
}

impl From<&Options> for AgentConfig {
    fn from(opts: &Options) -> Self {
        let device = if opts.cuda {
            Device::cuda_if_available()
        } else {
            Device::Cpu
        };
        match opts.algo {
            Algorithm::Dqn => Self::Dqn(DqnConfig {
                device,
                ..DqnConfig::default()
            }),
            Algorithm::Ddqn => Self::Dqn(DqnConfig {
                device,
                ..DqnConfig::with_target(DqnTarget::DoubleDqn)
            }),
            Algorithm::A2c => Self::ActorCritic(ActorCriticConfig {
                device,
                ..ActorCriticConfig::default()
            }),
        }
    }
}

impl AgentConfig {
    /// Build an agent that runs episodes in its own copy of `env`.
    pub fn build_episodic(
        &self,
        env: CartPole,
        rng: &mut Prng,
    ) -> Result<Box<dyn EpisodicAgent>, BuildAgentError> {
        let env_structure: &dyn EnvStructure = &env;
        let runner_rng = Prng::seed_from_u64(rng.gen());
        Ok(match self {
            Self::Dqn(config) => {
                let agent = config.build_agent(env_structure, rng)?;
                Box::new(EpisodeRunner::new(env, agent, runner_rng))
            }
            Self::ActorCritic(config) => {
                let agent = config.build_agent(env_structure, rng)?;
                Box::new(EpisodeRunner::new(env, agent, runner_rng))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::ActorMode;
    use clap::Parser;
    use rstest::rstest;

    #[rstest]
    #[case(Algorithm::Dqn, "dqn")]
    #[case(Algorithm::Ddqn, "ddqn")]
    #[case(Algorithm::A2c, "a2c")]
    fn algorithm_names(#[case] algorithm: Algorithm, #[case] name: &str) {
        assert_eq!(algorithm.to_string(), name);
        assert_eq!(Algorithm::from_str(name, false), Ok(algorithm));
    }

    #[test]
    fn ddqn_selects_double_target() {
        let opts = Options {
            algo: Algorithm::Ddqn,
            ..Options::parse_from(["run-cartpole"])
        };
        match AgentConfig::from(&opts) {
            AgentConfig::Dqn(config) => assert_eq!(config.target, DqnTarget::DoubleDqn),
            other => panic!("unexpected config {:?}", other),
        }
    }

    #[rstest]
    #[case(Algorithm::Dqn)]
    #[case(Algorithm::Ddqn)]
    #[case(Algorithm::A2c)]
    fn builds_runnable_agent(#[case] algo: Algorithm) {
        let opts = Options {
            algo,
            ..Options::parse_from(["run-cartpole"])
        };
        let mut rng = Prng::seed_from_u64(0);
        let mut agent = AgentConfig::from(&opts)
            .build_episodic(CartPole::default(), &mut rng)
            .unwrap();
        agent.set_mode(ActorMode::Evaluation);
        let outcome = agent.run(20);
        assert!(outcome.steps >= 1 && outcome.steps <= 20);
    }
}

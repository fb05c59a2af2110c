//! Advantage actor-critic agent
use super::feature_tensor;
use crate::agents::{
    ActorMode, Agent, AgentStats, BuildAgent, BuildAgentError, SaveWeightsError, Step,
};
use crate::envs::{EnvStructure, Features, Indexed, Successor};
use crate::torch::modules::{Activation, Mlp, MlpConfig};
use crate::torch::optimizers::{AdamConfig, Optimizer};
use crate::torch::serialize::DeviceDef;
use crate::utils::stats::OnlineMean;
use crate::Prng;
use log::warn;
use rand::distributions::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tch::{
    nn::{Module, VarStore},
    Device, Kind, TchError, Tensor,
};

/// Configuration for [`ActorCriticAgent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorCriticConfig {
    /// Policy network producing action logits.
    pub policy_config: MlpConfig,
    pub policy_optimizer_config: AdamConfig,
    /// State value network.
    pub critic_config: MlpConfig,
    pub critic_optimizer_config: AdamConfig,
    /// Weight of the policy entropy bonus in the policy loss.
    pub entropy_coefficient: f64,
    #[serde(with = "DeviceDef")]
    pub device: Device,
}

impl Default for ActorCriticConfig {
    fn default() -> Self {
        let tanh_mlp = MlpConfig {
            activation: Activation::Tanh,
            ..MlpConfig::default()
        };
        Self {
            policy_config: tanh_mlp.clone(),
            policy_optimizer_config: AdamConfig::with_learning_rate(1e-4),
            critic_config: tanh_mlp,
            critic_optimizer_config: AdamConfig::with_learning_rate(1e-3),
            entropy_coefficient: 0.0,
            device: Device::Cpu,
        }
    }
}

impl BuildAgent for ActorCriticConfig {
    type Agent = ActorCriticAgent;

    fn build_agent(
        &self,
        env: &dyn EnvStructure,
        _: &mut Prng,
    ) -> Result<Self::Agent, BuildAgentError> {
        ActorCriticAgent::new(env, self)
    }
}

/// Advantage actor-critic agent with one-step temporal difference updates.
///
/// Both networks are updated after every training step using the TD error
/// `r + γ V(s') - V(s)` as the advantage estimate.
///
/// Based on "[Asynchronous Methods for Deep Reinforcement Learning][a3c]"
/// by Mnih et al. (2016), run synchronously in a single environment.
///
/// [a3c]: https://arxiv.org/abs/1602.01783
pub struct ActorCriticAgent {
    /// Policy network variables; these are the saved weights.
    actor_vs: VarStore,
    actor: Mlp,
    actor_optimizer: Optimizer,
    critic_vs: VarStore,
    critic: Mlp,
    critic_optimizer: Optimizer,

    discount_factor: f64,
    entropy_coefficient: f64,
    num_actions: usize,

    policy_losses: OnlineMean,
    value_losses: OnlineMean,
    entropies: OnlineMean,

    device: Device,
}

impl fmt::Debug for ActorCriticAgent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ActorCriticAgent")
            .field("discount_factor", &self.discount_factor)
            .field("entropy_coefficient", &self.entropy_coefficient)
            .field("num_actions", &self.num_actions)
            .field("device", &self.device)
            .finish()
    }
}

impl ActorCriticAgent {
    pub fn new<E>(env: &E, config: &ActorCriticConfig) -> Result<Self, BuildAgentError>
    where
        E: EnvStructure + ?Sized,
    {
        let num_features = env.observation_dim();
        let num_actions = env.num_actions();
        if num_actions == 0 {
            return Err(BuildAgentError::NoActions);
        }
        if num_features == 0 {
            return Err(BuildAgentError::NoFeatures);
        }

        let actor_vs = VarStore::new(config.device);
        let actor = config
            .policy_config
            .build_module(&actor_vs.root(), num_features, num_actions);
        let actor_optimizer = config.policy_optimizer_config.build_optimizer(&actor_vs)?;

        let critic_vs = VarStore::new(config.device);
        let critic = config
            .critic_config
            .build_module(&critic_vs.root(), num_features, 1);
        let critic_optimizer = config.critic_optimizer_config.build_optimizer(&critic_vs)?;

        Ok(Self {
            actor_vs,
            actor,
            actor_optimizer,
            critic_vs,
            critic,
            critic_optimizer,
            discount_factor: env.discount_factor(),
            entropy_coefficient: config.entropy_coefficient,
            num_actions,
            policy_losses: OnlineMean::new(),
            value_losses: OnlineMean::new(),
            entropies: OnlineMean::new(),
            device: config.device,
        })
    }

    /// The policy network variables.
    #[must_use]
    pub const fn actor(&self) -> &VarStore {
        &self.actor_vs
    }

    /// The value network variables.
    #[must_use]
    pub const fn critic(&self) -> &VarStore {
        &self.critic_vs
    }

    /// Action probabilities for an observation.
    fn action_probs(&self, observation: &Tensor) -> Vec<f64> {
        let probs = tch::no_grad(|| {
            self.actor
                .forward(observation)
                .softmax(-1, Kind::Float)
                .to_device(Device::Cpu)
        });
        (0..self.num_actions)
            .map(|i| probs.double_value(&[super::as_dim(i)]))
            .collect()
    }

    /// One-step actor and critic update.
    ///
    /// Returns `(policy_loss, value_loss, entropy)`.
    fn train_step(
        &mut self,
        observation: &Tensor,
        action: usize,
        reward: f64,
        next_observation: Option<Tensor>,
    ) -> Result<(f64, f64, f64), TchError> {
        let next_value = match next_observation {
            Some(next) => tch::no_grad(|| self.critic.forward(&next)).double_value(&[0]),
            None => 0.0,
        };
        let value_target = reward + self.discount_factor * next_value;

        let value = self.critic.forward(observation).squeeze();
        let value_loss = (&value - value_target).square();
        let advantage = value_target - value.double_value(&[]);
        self.critic_optimizer.backward_step(&value_loss)?;

        let log_probs = self.actor.forward(observation).log_softmax(-1, Kind::Float);
        let entropy = -(log_probs.exp() * &log_probs).sum(Kind::Float);
        let policy_loss = log_probs.get(super::as_dim(action)) * (-advantage)
            - &entropy * self.entropy_coefficient;
        self.actor_optimizer.backward_step(&policy_loss)?;

        Ok((
            policy_loss.double_value(&[]),
            value_loss.double_value(&[]),
            entropy.double_value(&[]),
        ))
    }
}

impl<O, A> Agent<O, A> for ActorCriticAgent
where
    O: Features,
    A: Indexed,
{
    fn act(&mut self, observation: &O, mode: ActorMode, rng: &mut Prng) -> A {
        let probs = self.action_probs(&feature_tensor(observation, self.device));
        let index = match mode {
            ActorMode::Training => match WeightedIndex::new(&probs) {
                Ok(dist) => dist.sample(rng),
                Err(err) => {
                    warn!("invalid policy distribution {:?}: {}", probs, err);
                    argmax(&probs)
                }
            },
            ActorMode::Evaluation => argmax(&probs),
        };
        A::from_index(index).expect("action index within the environment action count")
    }

    fn update(&mut self, step: Step<O, A>) {
        let observation = feature_tensor(&step.observation, self.device);
        let next_observation = match &step.next {
            Successor::Continue(o) | Successor::Interrupt(o) => {
                Some(feature_tensor(o, self.device))
            }
            Successor::Terminate => None,
        };
        match self.train_step(
            &observation,
            step.action.as_index(),
            step.reward,
            next_observation,
        ) {
            Ok((policy_loss, value_loss, entropy)) => {
                self.policy_losses.push(policy_loss);
                self.value_losses.push(value_loss);
                self.entropies.push(entropy);
            }
            Err(err) => warn!("error in actor-critic update: {}", err),
        }
    }

    fn stats(&self) -> AgentStats {
        let mut stats = AgentStats::new();
        stats.insert_some("LossPi", self.policy_losses.mean());
        stats.insert_some("LossV", self.value_losses.mean());
        stats.insert_some("Entropy", self.entropies.mean());
        stats
    }

    fn save_weights(&self, path: &Path) -> Result<(), SaveWeightsError> {
        self.actor_vs.save(path)?;
        Ok(())
    }
}

/// Index of the largest value; the first on ties.
fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best_i, best_v), (i, &v)| {
            if v > best_v {
                (i, v)
            } else {
                (best_i, best_v)
            }
        })
        .0
}

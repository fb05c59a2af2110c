use super::{as_dim, feature_tensor};
use crate::agents::{
    ActorMode, Agent, AgentStats, BuildAgent, BuildAgentError, ExplorationRateSchedule,
    ReplayBuffer, SaveWeightsError, Step, Transition,
};
use crate::envs::{EnvStructure, Features, Indexed, Successor};
use crate::torch::modules::{Mlp, MlpConfig};
use crate::torch::optimizers::{AdamConfig, Optimizer};
use crate::torch::serialize::DeviceDef;
use crate::utils::stats::OnlineMean;
use crate::Prng;
use log::{debug, warn};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tch::{
    nn::{Module, VarStore},
    Device, Reduction, TchError, Tensor,
};

/// Bootstrap target for the action value update.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DqnTarget {
    /// `r + γ max_a Q_target(s', a)`
    Dqn,
    /// `r + γ Q_target(s', argmax_a Q(s', a))`
    ///
    /// From "[Deep Reinforcement Learning with Double Q-learning][ddqn]" by van Hasselt et al.
    ///
    /// [ddqn]: https://arxiv.org/abs/1509.06461
    DoubleDqn,
}

impl Default for DqnTarget {
    fn default() -> Self {
        Self::Dqn
    }
}

impl DqnTarget {
    /// Estimated value of each next observation in a batch.
    ///
    /// # Args
    /// * `next_action_values` - `qf(s')` with shape `[batch_size, num_actions]`.
    /// * `next_target_action_values` - `qf_target(s')` with the same shape.
    fn next_values(self, next_action_values: &Tensor, next_target_action_values: &Tensor) -> Tensor {
        match self {
            Self::Dqn => next_target_action_values.amax(&[-1], false),
            Self::DoubleDqn => {
                let best_actions = next_action_values.argmax(Some(-1), true);
                next_target_action_values
                    .gather(-1, &best_actions, false)
                    .squeeze_dim(-1)
            }
        }
    }
}

/// One-step bootstrapped action value targets `r + γ (1 - d) v(s')`.
///
/// `terminals` is `1.0` where the next observation is terminal, which leaves just the reward.
fn bootstrap_targets(
    rewards: &Tensor,
    terminals: &Tensor,
    discount_factor: f64,
    next_values: &Tensor,
) -> Tensor {
    let discounts = (-terminals + 1.0) * discount_factor;
    rewards + discounts * next_values
}

/// Configuration for [`DqnAgent`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqnConfig {
    pub action_value_fn_config: MlpConfig,
    pub optimizer_config: AdamConfig,

    pub target: DqnTarget,
    pub exploration_rate: ExplorationRateSchedule,
    /// Number of transitions sampled for each update.
    pub minibatch_size: usize,
    /// Maximum number of transitions in the replay buffer.
    pub buffer_capacity: usize,
    /// Copy the action value function into the target network every this many training steps.
    pub target_update_period: u64,

    #[serde(with = "DeviceDef")]
    pub device: Device,
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            action_value_fn_config: MlpConfig::default(),
            optimizer_config: AdamConfig::default(),
            target: DqnTarget::default(),
            exploration_rate: ExplorationRateSchedule::default(),
            minibatch_size: 64,
            buffer_capacity: 10_000,
            target_update_period: 100,
            device: Device::Cpu,
        }
    }
}

impl DqnConfig {
    /// Default configuration with the given bootstrap target.
    #[must_use]
    pub fn with_target(target: DqnTarget) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }
}

impl BuildAgent for DqnConfig {
    type Agent = DqnAgent;

    fn build_agent(
        &self,
        env: &dyn EnvStructure,
        rng: &mut Prng,
    ) -> Result<Self::Agent, BuildAgentError> {
        DqnAgent::new(env, self, Prng::seed_from_u64(rng.gen()))
    }
}

/// Deep Q-Learning Agent
///
/// Based on
/// "[Playing Atari with Deep Reinforcement Learning][dqn]"
/// by Volodymyr Mnih et al. (2013)
/// with a periodically synchronized target network from
/// "[Human-level control through deep reinforcement learning][nature]"
/// by Mnih et al. (2015).
///
/// [dqn]: https://arxiv.org/pdf/1312.5602.pdf
/// [nature]: https://www.nature.com/articles/nature14236
pub struct DqnAgent {
    /// Variables of the action value function `qf`; these are the saved weights.
    qf_vs: VarStore,
    qf: Mlp,
    qf_target_vs: VarStore,
    qf_target: Mlp,
    optimizer: Optimizer,

    buffer: ReplayBuffer,
    target: DqnTarget,
    exploration_rate: ExplorationRateSchedule,
    minibatch_size: usize,
    target_update_period: u64,
    discount_factor: f64,
    num_actions: usize,

    /// Total number of training steps.
    global_steps: u64,
    losses: OnlineMean,

    device: Device,
    /// Prng for sampling minibatches.
    rng: Prng,
}

impl fmt::Debug for DqnAgent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DqnAgent")
            .field("target", &self.target)
            .field("exploration_rate", &self.exploration_rate)
            .field("minibatch_size", &self.minibatch_size)
            .field("target_update_period", &self.target_update_period)
            .field("discount_factor", &self.discount_factor)
            .field("global_steps", &self.global_steps)
            .field("buffer_len", &self.buffer.len())
            .field("device", &self.device)
            .finish()
    }
}

impl DqnAgent {
    pub fn new<E>(env: &E, config: &DqnConfig, rng: Prng) -> Result<Self, BuildAgentError>
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

        let qf_vs = VarStore::new(config.device);
        let qf = config
            .action_value_fn_config
            .build_module(&qf_vs.root(), num_features, num_actions);
        let mut qf_target_vs = VarStore::new(config.device);
        let qf_target =
            config
                .action_value_fn_config
                .build_module(&qf_target_vs.root(), num_features, num_actions);
        qf_target_vs.copy(&qf_vs)?;
        let optimizer = config.optimizer_config.build_optimizer(&qf_vs)?;

        Ok(Self {
            qf_vs,
            qf,
            qf_target_vs,
            qf_target,
            optimizer,
            buffer: ReplayBuffer::with_capacity(config.buffer_capacity),
            target: config.target,
            exploration_rate: config.exploration_rate,
            minibatch_size: config.minibatch_size,
            target_update_period: config.target_update_period,
            discount_factor: env.discount_factor(),
            num_actions,
            global_steps: 0,
            losses: OnlineMean::new(),
            device: config.device,
            rng,
        })
    }

    /// The action value network variables.
    #[must_use]
    pub const fn qf(&self) -> &VarStore {
        &self.qf_vs
    }

    /// Number of training steps taken so far.
    #[must_use]
    pub const fn global_steps(&self) -> u64 {
        self.global_steps
    }

    fn greedy_action(&self, observation: &Tensor) -> usize {
        let action_values = tch::no_grad(|| self.qf.forward(observation));
        let index = action_values.argmax(Some(-1), false).int64_value(&[]);
        usize::try_from(index).expect("argmax is non-negative")
    }

    /// Sample a minibatch from the replay buffer and take one optimization step.
    ///
    /// Returns the minibatch loss.
    fn train_minibatch(&mut self) -> Result<Option<f64>, TchError> {
        let batch = match self.buffer.sample_batch(self.minibatch_size, &mut self.rng) {
            Some(batch) => batch,
            None => return Ok(None),
        };
        let batch_size = as_dim(batch.len());
        let observations = Tensor::of_slice(&batch.observations)
            .view([batch_size, -1])
            .to_device(self.device);
        let next_observations = Tensor::of_slice(&batch.next_observations)
            .view([batch_size, -1])
            .to_device(self.device);
        let actions = Tensor::of_slice(&batch.actions)
            .to_device(self.device)
            .unsqueeze(-1);
        let rewards = Tensor::of_slice(&batch.rewards).to_device(self.device);
        let terminals = Tensor::of_slice(&batch.terminals).to_device(self.device);

        let targets = tch::no_grad(|| {
            let next_values = self.target.next_values(
                &self.qf.forward(&next_observations),
                &self.qf_target.forward(&next_observations),
            );
            bootstrap_targets(&rewards, &terminals, self.discount_factor, &next_values)
        });

        let action_values = self
            .qf
            .forward(&observations)
            .gather(-1, &actions, false)
            .squeeze_dim(-1);
        let loss = action_values.mse_loss(&targets, Reduction::Mean);
        self.optimizer.backward_step(&loss)?;
        Ok(Some(loss.double_value(&[])))
    }
}

impl<O, A> Agent<O, A> for DqnAgent
where
    O: Features,
    A: Indexed,
{
    fn act(&mut self, observation: &O, mode: ActorMode, rng: &mut Prng) -> A {
        let exploration_rate = self
            .exploration_rate
            .exploration_rate(self.global_steps, mode)
            .clamp(0.0, 1.0);
        let index = if rng.gen_bool(exploration_rate) {
            rng.gen_range(0..self.num_actions)
        } else {
            self.greedy_action(&feature_tensor(observation, self.device))
        };
        A::from_index(index).expect("action index within the environment action count")
    }

    #[allow(clippy::cast_possible_truncation)]
    fn update(&mut self, step: Step<O, A>) {
        let next_observation = match &step.next {
            Successor::Continue(o) | Successor::Interrupt(o) => o.features(),
            Successor::Terminate => vec![0.0; O::NUM_FEATURES],
        };
        self.buffer.push(Transition {
            observation: step.observation.features(),
            action: step.action.as_index(),
            reward: step.reward as f32,
            next_observation,
            terminal: step.next.is_terminal(),
        });
        self.global_steps += 1;

        if self.buffer.len() <= self.minibatch_size {
            return;
        }
        match self.train_minibatch() {
            Ok(Some(loss)) => self.losses.push(loss),
            Ok(None) => {}
            Err(err) => warn!("error in action value update: {}", err),
        }
        if self.global_steps % self.target_update_period == 0 {
            debug!("updating target network at step {}", self.global_steps);
            if let Err(err) = self.qf_target_vs.copy(&self.qf_vs) {
                warn!("error updating target network: {}", err);
            }
        }
    }

    fn stats(&self) -> AgentStats {
        let mut stats = AgentStats::new();
        stats.insert_some("LossQ", self.losses.mean());
        stats.insert(
            "Epsilon",
            self.exploration_rate
                .exploration_rate(self.global_steps, ActorMode::Training),
        );
        stats
    }

    fn save_weights(&self, path: &Path) -> Result<(), SaveWeightsError> {
        self.qf_vs.save(path)?;
        Ok(())
    }
}

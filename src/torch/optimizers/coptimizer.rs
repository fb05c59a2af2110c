//! Torch optimizer configuration
use super::Optimizer;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use tch::{nn::VarStore, COptimizer, TchError};

/// Configuration for the Adam optimizer.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdamConfig {
    /// Learning rate
    pub learning_rate: f64,
    /// Coefficient for the running average of the gradient
    pub beta1: f64,
    /// Coefficient for the running average of the square of the gradient
    pub beta2: f64,
    /// Weight decay (L2 penalty)
    pub weight_decay: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            weight_decay: 0.0,
        }
    }
}

impl AdamConfig {
    /// Adam with the default coefficients and the given learning rate.
    #[must_use]
    pub fn with_learning_rate(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            ..Self::default()
        }
    }

    /// Build an optimizer for the trainable variables of `vs`.
    pub fn build_optimizer(&self, vs: &VarStore) -> Result<Optimizer, TchError> {
        Optimizer::new(COptimizer::try_from(self)?, vs)
    }
}

impl TryFrom<&AdamConfig> for COptimizer {
    type Error = TchError;
    fn try_from(config: &AdamConfig) -> Result<Self, Self::Error> {
        Self::adam(
            config.learning_rate,
            config.beta1,
            config.beta2,
            config.weight_decay,
        )
    }
}

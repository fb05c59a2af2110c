//! Optimizers
mod coptimizer;

pub use coptimizer::AdamConfig;

use std::fmt;
use tch::{nn::VarStore, COptimizer, TchError, Tensor};

/// Optimizer that minimizes a loss tensor with one gradient evaluation per step.
pub struct Optimizer {
    inner: COptimizer,
}

impl fmt::Debug for Optimizer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Optimizer").finish()
    }
}

impl Optimizer {
    /// Create an optimizer for all trainable variables in a variable store.
    pub fn new(mut inner: COptimizer, vs: &VarStore) -> Result<Self, TchError> {
        for var in vs.trainable_variables() {
            inner.add_parameters(&var, 0)?;
        }
        Ok(Self { inner })
    }

    /// Back-propagate `loss` and perform a parameter update.
    ///
    /// Existing gradients are cleared first.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<(), TchError> {
        self.inner.zero_grad()?;
        loss.backward();
        self.inner.step()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{Device, Kind};

    #[test]
    fn adam_optimizes_quadratic() {
        let vs = VarStore::new(Device::Cpu);
        let x = vs.root().zeros("x", &[2]);
        let target = Tensor::of_slice(&[1.0f32, -2.0]);
        let config = AdamConfig {
            learning_rate: 0.1,
            ..AdamConfig::default()
        };
        let mut optimizer = config.build_optimizer(&vs).unwrap();
        for _ in 0..500 {
            let loss = (&x - &target).square().sum(Kind::Float);
            optimizer.backward_step(&loss).unwrap();
        }
        let error = (&x - &target).abs().max().double_value(&[]);
        assert!(error < 1e-2, "error: {}", error);
    }
}

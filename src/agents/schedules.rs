//! Parameter schedules as functions of the global training step count
use super::ActorMode;
use serde::{Deserialize, Serialize};

/// Selects the exploration rate as a function the elapsed training step count.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExplorationRateSchedule {
    Constant(f64),
    LinearAnnealed {
        start: f64,
        end: f64,
        /// Number of steps to reach the `end` value.
        period: u64,
    },
    /// Multiply by `decay` on every step, never going below `min`.
    ExponentialDecay { start: f64, decay: f64, min: f64 },
}

/// Exponential decay suited to short Cart-Pole runs.
impl Default for ExplorationRateSchedule {
    fn default() -> Self {
        Self::ExponentialDecay {
            start: 1.0,
            decay: 0.995,
            min: 0.01,
        }
    }
}

impl ExplorationRateSchedule {
    #[must_use]
    pub fn exploration_rate(&self, global_steps: u64, mode: ActorMode) -> f64 {
        use ExplorationRateSchedule::{Constant, ExponentialDecay, LinearAnnealed};
        match (mode, self) {
            (ActorMode::Evaluation, _) => 0.0,
            (ActorMode::Training, Constant(rate)) => *rate,
            (ActorMode::Training, LinearAnnealed { start, end, period }) => {
                (global_steps as f64 / *period as f64).min(1.0) * (end - start) + start
            }
            (ActorMode::Training, ExponentialDecay { start, decay, min }) => {
                // powi takes an i32; past that many steps the rate has long reached `min`.
                let steps = i32::try_from(global_steps).unwrap_or(i32::MAX);
                (start * decay.powi(steps)).max(*min)
            }
        }
    }
}

//! Reinforcement learning environments
mod cartpole;
#[cfg(test)]
pub mod testing;

pub use cartpole::{
    CartPole, CartPoleInternalState, CartPolePhysicalState, EnvironmentParams,
    PhysicalConstants, Push,
};

use crate::Prng;

/// The external structure of a reinforcement learning environment.
pub trait EnvStructure {
    /// Number of features in each observation vector.
    fn observation_dim(&self) -> usize;

    /// Number of discrete actions.
    fn num_actions(&self) -> usize;

    /// A lower and upper bound on possible reward values.
    ///
    /// These bounds are not required to be tight but ideally will be as tight as possible.
    fn reward_range(&self) -> (f64, f64);

    /// A discount factor applied to future rewards.
    ///
    /// A value between `0` and `1`, inclusive.
    fn discount_factor(&self) -> f64;
}

/// A reinforcement learning environment.
///
/// This defines the environment dynamics and structure.
/// It does not internally manage state.
pub trait Environment: EnvStructure {
    type State;
    type Observation: Features;
    type Action: Indexed;

    /// Sample a new initial state.
    fn initial_state(&self, rng: &mut Prng) -> Self::State;

    /// Observe a state.
    fn observe(&self, state: &Self::State, rng: &mut Prng) -> Self::Observation;

    /// Perform a state transition.
    ///
    /// # Returns
    /// * `successor`: The resulting state. [`Successor::Terminate`] if the episode is over and
    ///     all future rewards are zero.
    /// * `reward`: The reward value for this transition.
    fn step(
        &self,
        state: Self::State,
        action: &Self::Action,
        rng: &mut Prng,
    ) -> (Successor<Self::State>, f64);
}

/// The successor state or outcome of an episode step.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Successor<T> {
    /// The episode continues with the given state.
    Continue(T),
    /// The episode ends by entering a terminal state.
    ///
    /// A terminal state is one from which all possible trajectories would have 0 reward.
    Terminate,
    /// The episode ends despite entering the given non-terminal state.
    ///
    /// This is used when an episode is cut off by a step limit.
    Interrupt(T),
}

impl<T> Successor<T> {
    /// Whether this successor marks the end of an episode.
    #[inline]
    pub const fn episode_done(&self) -> bool {
        !matches!(self, Successor::Continue(_))
    }

    /// Whether the successor is a terminal state.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Successor::Terminate)
    }

    /// Convert into the inner continuing state if any.
    #[inline]
    pub fn into_continue(self) -> Option<T> {
        match self {
            Successor::Continue(state) => Some(state),
            _ => None,
        }
    }

    /// Interrupt an episode at the current state.
    ///
    /// `Continue` becomes `Interrupt`; the other variants are unchanged.
    #[inline]
    #[must_use]
    pub fn interrupt(self) -> Self {
        match self {
            Successor::Continue(state) => Successor::Interrupt(state),
            other => other,
        }
    }

    /// Apply a function to the inner state.
    #[inline]
    pub fn map<F, U>(self, f: F) -> Successor<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Successor::Continue(state) => Successor::Continue(f(state)),
            Successor::Terminate => Successor::Terminate,
            Successor::Interrupt(state) => Successor::Interrupt(f(state)),
        }
    }

    /// Get a reference to the inner state, if any.
    #[inline]
    pub const fn as_ref(&self) -> Successor<&T> {
        match self {
            Successor::Continue(state) => Successor::Continue(state),
            Successor::Terminate => Successor::Terminate,
            Successor::Interrupt(state) => Successor::Interrupt(state),
        }
    }
}

/// A type whose values are in one-to-one correspondence with `0 .. SIZE`.
pub trait Indexed: Sized {
    /// Number of distinct values.
    const SIZE: usize;

    /// The index of this value.
    fn as_index(&self) -> usize;

    /// The value with the given index, if in range.
    fn from_index(index: usize) -> Option<Self>;
}

/// An observation that can be represented as a vector of real-valued features.
pub trait Features {
    /// Number of features.
    const NUM_FEATURES: usize;

    /// Write the features into `out`, which has length `NUM_FEATURES`.
    fn write_features(&self, out: &mut [f32]);

    /// The features as a new vector.
    fn features(&self) -> Vec<f32> {
        let mut out = vec![0.0; Self::NUM_FEATURES];
        self.write_features(&mut out);
        out
    }
}

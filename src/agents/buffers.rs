//! Experience replay
use crate::Prng;
use rand::distributions::{Distribution, Uniform};
use std::collections::{vec_deque, VecDeque};

/// A single stored transition with observations already converted to features.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub observation: Vec<f32>,
    pub action: usize,
    pub reward: f32,
    pub next_observation: Vec<f32>,
    /// Whether `next_observation` is terminal (all future rewards are zero).
    ///
    /// Steps interrupted by a step limit are not terminal.
    pub terminal: bool,
}

/// A minibatch of transitions in row-major flat arrays.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransitionBatch {
    /// `[batch_size * num_features]`
    pub observations: Vec<f32>,
    /// `[batch_size]`
    pub actions: Vec<i64>,
    /// `[batch_size]`
    pub rewards: Vec<f32>,
    /// `[batch_size * num_features]`
    pub next_observations: Vec<f32>,
    /// `[batch_size]`; `1.0` for terminal transitions.
    pub terminals: Vec<f32>,
}

impl TransitionBatch {
    /// Number of transitions in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// A fixed-capacity first-in first-out buffer of transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayBuffer {
    /// Once full, the oldest transition is dropped for each new one.
    transitions: VecDeque<Transition>,
    capacity: usize,
    /// Total number of transitions pushed over the buffer lifetime.
    total_count: u64,
}

impl ReplayBuffer {
    /// Create a new `ReplayBuffer` holding at most `capacity` transitions.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "replay buffer capacity must be positive");
        Self {
            transitions: VecDeque::with_capacity(capacity),
            capacity,
            total_count: 0,
        }
    }

    /// The number of stored transitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Total number of transitions pushed, including those since dropped.
    #[must_use]
    pub const fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn push(&mut self, transition: Transition) {
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
        self.total_count += 1;
    }

    pub fn iter(&self) -> vec_deque::Iter<Transition> {
        self.transitions.iter()
    }

    /// Sample a minibatch uniformly at random with replacement.
    ///
    /// Returns `None` if the buffer is empty.
    pub fn sample_batch(&self, batch_size: usize, rng: &mut Prng) -> Option<TransitionBatch> {
        if self.transitions.is_empty() {
            return None;
        }
        let index_dist = Uniform::new(0, self.transitions.len());
        let num_features = self.transitions[0].observation.len();
        let mut batch = TransitionBatch {
            observations: Vec::with_capacity(batch_size * num_features),
            actions: Vec::with_capacity(batch_size),
            rewards: Vec::with_capacity(batch_size),
            next_observations: Vec::with_capacity(batch_size * num_features),
            terminals: Vec::with_capacity(batch_size),
        };
        for index in index_dist.sample_iter(rng).take(batch_size) {
            let t = &self.transitions[index];
            batch.observations.extend_from_slice(&t.observation);
            #[allow(clippy::cast_possible_wrap)]
            batch.actions.push(t.action as i64);
            batch.rewards.push(t.reward);
            batch.next_observations.extend_from_slice(&t.next_observation);
            batch.terminals.push(if t.terminal { 1.0 } else { 0.0 });
        }
        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn transition(i: usize) -> Transition {
        #[allow(clippy::cast_precision_loss)]
        let x = i as f32;
        Transition {
            observation: vec![x, -x],
            action: i % 2,
            reward: 1.0,
            next_observation: vec![x + 1.0, -x - 1.0],
            terminal: i % 3 == 0,
        }
    }

    #[test]
    fn drops_oldest_when_full() {
        let mut buffer = ReplayBuffer::with_capacity(3);
        for i in 0..5 {
            buffer.push(transition(i));
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.total_count(), 5);
        let kept: Vec<_> = buffer.iter().map(|t| t.observation[0]).collect();
        assert_eq!(kept, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn sample_empty_is_none() {
        let buffer = ReplayBuffer::with_capacity(3);
        assert!(buffer
            .sample_batch(4, &mut Prng::seed_from_u64(0))
            .is_none());
    }

    #[test]
    fn sample_batch_shapes() {
        let mut buffer = ReplayBuffer::with_capacity(10);
        for i in 0..4 {
            buffer.push(transition(i));
        }
        let batch = buffer
            .sample_batch(8, &mut Prng::seed_from_u64(1))
            .unwrap();
        assert_eq!(batch.len(), 8);
        assert_eq!(batch.observations.len(), 16);
        assert_eq!(batch.next_observations.len(), 16);
        assert_eq!(batch.terminals.len(), 8);
        for (i, action) in batch.actions.iter().enumerate() {
            // Each row must come from a single stored transition
            let x = batch.observations[2 * i];
            assert_eq!(batch.next_observations[2 * i], x + 1.0);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let source = x as usize;
            #[allow(clippy::cast_possible_wrap)]
            let expected_action = (source % 2) as i64;
            assert_eq!(*action, expected_action);
        }
    }
}

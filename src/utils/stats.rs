//! Online statistics
use std::iter::{Extend, FromIterator};

/// Online mean calculation using Welford's Algorithm.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct OnlineMean {
    mean: f64,
    count: u64,
}

impl OnlineMean {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mean: 0.0,
            count: 0,
        }
    }

    /// Add a new value to the calculation.
    #[allow(clippy::cast_precision_loss)]
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
    }

    /// The mean of all accumulated values, if any.
    #[must_use]
    pub const fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.mean)
        }
    }

    /// The number of accumulated values.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }
}

impl Extend<f64> for OnlineMean {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = f64>,
    {
        for value in iter {
            self.push(value)
        }
    }
}

impl FromIterator<f64> for OnlineMean {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut s = Self::new();
        s.extend(iter);
        s
    }
}

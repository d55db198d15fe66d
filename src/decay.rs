use std::num::NonZeroU32;

use crate::util::round_to;

/// An implementation of a time-decaying value
pub trait Decay {
    /// Calculate value at time `t`
    fn evaluate(&self, t: f32) -> f32;
}

/// A constant value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constant {
    value: f32,
}

impl Constant {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl Decay for Constant {
    fn evaluate(&self, _t: f32) -> f32 {
        self.value
    }
}

/// Linear annealing over a fixed batch of `n` episodes, rounded to two decimals
///
/// v(t) = round(1 - (t + 1) / n, 2)
///
/// The value reaches `0.0` on the last episode of the batch. Consumers that must keep
/// some residual randomness ignore non-positive values, see
/// [`EpsilonGreedy::anneal`](crate::exploration::EpsilonGreedy::anneal).
#[derive(Debug, Clone, PartialEq)]
pub struct Annealing {
    episodes: NonZeroU32,
}

impl Annealing {
    pub fn new(episodes: NonZeroU32) -> Self {
        Self { episodes }
    }

    pub fn episodes(&self) -> u32 {
        self.episodes.get()
    }
}

impl Decay for Annealing {
    fn evaluate(&self, t: f32) -> f32 {
        round_to(1.0 - (t + 1.0) / self.episodes.get() as f32, 2)
    }
}

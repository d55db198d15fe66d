use rand::Rng;

use crate::{assert_interval, decay::Decay};

use super::Choice;

/// Epsilon greedy exploration policy with an annealed epsilon threshold
///
/// Unlike a pure function of time, the threshold is stateful: [`anneal`](Self::anneal)
/// only ever applies positive values, so once epsilon has been positive it never
/// reaches zero.
#[derive(Debug, Clone, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f32,
    initial: f32,
}

impl EpsilonGreedy {
    /// Initialize epsilon greedy policy with a starting epsilon
    ///
    /// **Panics** if `epsilon` is not in the interval `[0,1]`
    pub fn new(epsilon: f32) -> Self {
        assert_interval!(epsilon, 0.0, 1.0);
        Self {
            epsilon,
            initial: epsilon,
        }
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Move epsilon to the schedule's value at time `t`
    ///
    /// Non-positive values are ignored, leaving epsilon at the last positive value it held.
    pub fn anneal<D: Decay>(&mut self, schedule: &D, t: u32) {
        let candidate = schedule.evaluate(t as f32);
        if candidate > 0.0 {
            self.epsilon = candidate.min(1.0);
        }
    }

    /// Restore the starting epsilon
    pub fn reset(&mut self) {
        self.epsilon = self.initial;
    }

    /// Invoke epsilon greedy policy with the current epsilon
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Choice {
        if rng.gen::<f32>() < self.epsilon {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use rand::{rngs::StdRng, SeedableRng};

    use crate::decay::Annealing;

    use super::*;

    #[test]
    fn anneal_mid_batch() {
        let schedule = Annealing::new(NonZeroU32::new(100).unwrap());
        let mut policy = EpsilonGreedy::default();
        for i in 0..50 {
            policy.anneal(&schedule, i);
        }
        assert_eq!(policy.epsilon(), 0.5, "Epsilon after episode 49");
    }

    #[test]
    fn anneal_keeps_last_positive_value() {
        let schedule = Annealing::new(NonZeroU32::new(100).unwrap());
        let mut policy = EpsilonGreedy::default();
        for i in 0..99 {
            policy.anneal(&schedule, i);
        }
        let before_last = policy.epsilon();
        assert_eq!(before_last, 0.01);

        policy.anneal(&schedule, 99);
        assert_eq!(policy.epsilon(), before_last, "Zero candidate is not applied");
        assert!(policy.epsilon() > 0.0);
    }

    #[test]
    fn reset_restores_start() {
        let schedule = Annealing::new(NonZeroU32::new(10).unwrap());
        let mut policy = EpsilonGreedy::default();
        policy.anneal(&schedule, 5);
        assert_ne!(policy.epsilon(), 1.0);
        policy.reset();
        assert_eq!(policy.epsilon(), 1.0);
    }

    #[test]
    fn choose_extremes() {
        let mut rng = StdRng::seed_from_u64(0);
        let explore = EpsilonGreedy::new(1.0);
        let exploit = EpsilonGreedy::new(0.0);
        for _ in 0..100 {
            assert!(matches!(explore.choose(&mut rng), Choice::Explore));
            assert!(matches!(exploit.choose(&mut rng), Choice::Exploit));
        }
    }

    #[test]
    #[should_panic]
    fn epsilon_out_of_range() {
        EpsilonGreedy::new(1.5);
    }
}

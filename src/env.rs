use std::{collections::BTreeMap, ops::Index};

/// Represents a Markov decision process, defining the dynamics of an environment
/// in which an agent can operate.
///
/// This base trait represents the common case of a discrete-time MDP with one agent
/// and a finite state space and action space.
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type State;

    /// A representation of an action that an agent can take to affect the environment
    type Action;

    /// Determine if the state is active or terminal
    fn is_active(&self) -> bool;

    /// Update the environment in response to an action taken by an agent, producing a new state and associated reward
    ///
    /// **Returns** `(next_state, reward)`, where `next_state` is `None` once the environment is terminal
    fn step(&mut self, action: Self::Action) -> (Option<Self::State>, f32);

    /// Reset the environment to an initial state
    ///
    /// **Returns** the state
    fn reset(&mut self) -> Self::State;

    /// Sample an action that is available in the current state
    fn random_action(&mut self) -> Self::Action;
}

/// An environment with a finite, state dependent set of actions
pub trait DiscreteActionSpace: Environment {
    /// Get the available actions for the current state
    ///
    /// The returned `Vec` is only empty in terminal states.
    fn actions(&self) -> Vec<Self::Action>;
}

/// Represents a single experience or transition in the environment
pub struct Exp<E: Environment> {
    /// The state of the environment before taking the action
    pub state: E::State,
    /// The action taken in the given state
    pub action: E::Action,
    /// The state of the environment after the action is taken, or if terminal, `None`
    pub next_state: Option<E::State>,
    /// The reward received after taking the action
    pub reward: f32,
}

/// Named per-episode statistics accumulated by an environment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    values: BTreeMap<&'static str, f64>,
}

impl Report {
    /// Create a report tracking `keys`, all starting at zero
    pub fn new(keys: Vec<&'static str>) -> Self {
        Self {
            values: keys.into_iter().map(|k| (k, 0.0)).collect(),
        }
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.values.keys().copied().collect()
    }

    /// Add `amount` to a tracked key, ignoring unknown keys
    pub fn add(&mut self, key: &'static str, amount: f64) {
        if let Some(value) = self.values.get_mut(key) {
            *value += amount;
        }
    }

    /// Take the current values, resetting every key to zero
    pub fn take(&mut self) -> BTreeMap<&'static str, f64> {
        let zeroed = self.values.keys().map(|&k| (k, 0.0)).collect();
        std::mem::replace(&mut self.values, zeroed)
    }
}

impl Index<&str> for Report {
    type Output = f64;

    fn index(&self, key: &str) -> &Self::Output {
        &self.values[key]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_take_resets() {
        let mut report = Report::new(vec!["steps", "reward"]);
        report.add("steps", 1.0);
        report.add("steps", 1.0);
        report.add("reward", -10.0);
        report.add("unknown", 5.0);
        assert_eq!(report["steps"], 2.0);
        assert_eq!(report.keys(), vec!["reward", "steps"]);

        let taken = report.take();
        assert_eq!(taken.get("reward"), Some(&-10.0));
        assert_eq!(taken.get("unknown"), None, "Untracked keys are ignored");
        assert_eq!(report["steps"], 0.0, "Values reset after take");
    }
}

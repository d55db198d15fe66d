use std::collections::HashMap;

use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    assert_interval,
    decay::{self, Decay},
    env::{DiscreteActionSpace, Environment, Exp},
    exploration::{Choice, EpsilonGreedy},
};

use super::Hashable;

/// Configuration for the [`QTableAgent`]
pub struct QTableAgentConfig<D: Decay> {
    pub exploration: EpsilonGreedy,
    /// Epsilon schedule, evaluated at the start of every episode
    pub schedule: D,
    pub alpha: f32,
    pub gamma: f32,
}

impl Default for QTableAgentConfig<decay::Constant> {
    fn default() -> Self {
        Self {
            exploration: EpsilonGreedy::new(1.0),
            schedule: decay::Constant::new(1.0),
            alpha: 0.1,
            gamma: 0.8,
        }
    }
}

/// A simple Q-learning agent that utilizes a Q-table to learn its environment
///
/// ### Generics
/// - `E` - The [`Environment`] in which the agent will learn
///     - The environment's state and action spaces must both be discrete because a Q value will be recorded for each state action pair
///     - For the same reason, the state and action types must be [`Hashable`] to be used as keys in a [`HashMap`]
/// - `D` - The epsilon [`Decay`] schedule
/// - `R` - The random number generator driving exploration
pub struct QTableAgent<E, D = decay::Constant, R = StdRng>
where
    E: Environment + DiscreteActionSpace,
    E::State: Hashable,
    E::Action: Hashable,
    D: Decay,
    R: Rng,
{
    q_table: HashMap<(E::State, E::Action), f32>,
    exploration: EpsilonGreedy,
    schedule: D,
    alpha: f32,   // learning rate
    gamma: f32,   // discount factor
    episode: u32, // current episode
    rng: R,
}

impl<E, D> QTableAgent<E, D>
where
    E: Environment + DiscreteActionSpace,
    E::State: Hashable,
    E::Action: Hashable,
    D: Decay,
{
    /// Initialize a new `QTableAgent` with an entropy seeded generator
    ///
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn new(config: QTableAgentConfig<D>) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<E, D, R> QTableAgent<E, D, R>
where
    E: Environment + DiscreteActionSpace,
    E::State: Hashable,
    E::Action: Hashable,
    D: Decay,
    R: Rng,
{
    /// Initialize a new `QTableAgent` driven by `rng`
    ///
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn with_rng(config: QTableAgentConfig<D>, rng: R) -> Self {
        assert_interval!(config.alpha, 0.0, 1.0);
        assert_interval!(config.gamma, 0.0, 1.0);
        Self {
            q_table: HashMap::new(),
            exploration: config.exploration,
            schedule: config.schedule,
            alpha: config.alpha,
            gamma: config.gamma,
            episode: 0,
            rng,
        }
    }

    pub fn get_q_table(&self) -> &HashMap<(E::State, E::Action), f32> {
        &self.q_table
    }

    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Forget everything learned so far
    pub fn reset(&mut self) {
        self.q_table.clear();
        self.exploration.reset();
        self.episode = 0;
    }

    fn value(&self, state: E::State, action: E::Action) -> f32 {
        self.q_table.get(&(state, action)).copied().unwrap_or_default()
    }

    /// The highest valued action, preferring the later action on ties
    fn best(&self, state: E::State, actions: &[E::Action]) -> Option<E::Action> {
        actions.iter().copied().max_by(|&a, &b| {
            self.value(state, a).total_cmp(&self.value(state, b))
        })
    }

    fn act(&mut self, env: &mut E, state: E::State, actions: &[E::Action]) -> E::Action {
        match self.exploration.choose(&mut self.rng) {
            Choice::Explore => env.random_action(),
            Choice::Exploit => self
                .best(state, actions)
                .expect("There is always at least one action available"),
        }
    }

    fn learn(&mut self, experience: Exp<E>, next_actions: &[E::Action]) {
        let Exp {
            state,
            action,
            next_state,
            reward,
        } = experience;

        let q_value = self.value(state, action);
        let max_next_q = next_state
            .and_then(|s| {
                next_actions
                    .iter()
                    .map(|&a| self.value(s, a))
                    .max_by(|a, b| a.total_cmp(b))
            })
            .unwrap_or(0.0);
        let new_q_value = q_value + self.alpha * (reward + self.gamma * max_next_q - q_value);

        self.q_table.insert((state, action), new_q_value);
    }

    /// Run one learning episode in the given environment
    ///
    /// **Returns** the number of steps taken
    pub fn go(&mut self, env: &mut E) -> usize {
        self.exploration.anneal(&self.schedule, self.episode);

        let start = env.reset();
        let mut next_state = env.is_active().then_some(start);
        let mut actions = env.actions();
        let mut steps = 0;
        while let Some(state) = next_state {
            let action = self.act(env, state, &actions);
            let (next, reward) = env.step(action);
            next_state = next;
            actions = env.actions();
            steps += 1;

            self.learn(
                Exp {
                    state,
                    action,
                    next_state,
                    reward,
                },
                &actions,
            );
        }

        debug!(
            "episode {} finished after {steps} steps (epsilon {})",
            self.episode,
            self.exploration.epsilon()
        );
        self.episode += 1;
        steps
    }

    /// Evacuate greedily from a freshly reset environment without learning
    ///
    /// **Returns** the number of steps needed to finish, or `None` if `limit` steps were not enough
    pub fn exploit(&self, env: &mut E, limit: usize) -> Option<usize> {
        let start = env.reset();
        self.exploit_from(env, start, limit)
    }

    /// Follow the greedy policy from `state`, which must be the environment's current state
    pub fn exploit_from(&self, env: &mut E, state: E::State, limit: usize) -> Option<usize> {
        let mut state = env.is_active().then_some(state);
        let mut steps = 0;
        while let Some(current) = state {
            if steps == limit {
                return None;
            }
            let action = self.best(current, &env.actions())?;
            state = env.step(action).0;
            steps += 1;
        }
        Some(steps)
    }
}

#[cfg(test)]
mod tests {
    use crate::gym::Building;

    use super::*;

    fn trained(episodes: u32) -> (QTableAgent<Building>, Building) {
        let mut env = Building::with_rng(StdRng::seed_from_u64(11));
        let mut agent: QTableAgent<Building> =
            QTableAgent::with_rng(QTableAgentConfig::default(), StdRng::seed_from_u64(5));
        for _ in 0..episodes {
            agent.go(&mut env);
        }
        (agent, env)
    }

    #[test]
    fn learn_terminal_transition() {
        let mut agent: QTableAgent<Building> =
            QTableAgent::with_rng(QTableAgentConfig::default(), StdRng::seed_from_u64(0));
        agent.learn(
            Exp {
                state: 4,
                action: 5,
                next_state: None,
                reward: 100.0,
            },
            &[],
        );
        assert_eq!(agent.get_q_table()[&(4, 5)], 10.0, "alpha * reward");

        agent.learn(
            Exp {
                state: 0,
                action: 4,
                next_state: Some(4),
                reward: -10.0,
            },
            &[0, 3, 5],
        );
        assert_eq!(agent.get_q_table()[&(0, 4)], 0.1 * (-10.0 + 0.8 * 10.0));
    }

    #[test]
    fn evacuates_by_shortest_route() {
        let (agent, mut env) = trained(1000);
        assert_eq!(agent.episode(), 1000);

        let shortest = [2, 1, 3, 2, 1, 0];
        for (room, &steps) in shortest.iter().enumerate() {
            env.enter(room);
            assert_eq!(
                agent.exploit_from(&mut env, room, 20),
                Some(steps),
                "Evacuating room {room}"
            );
        }
    }

    #[test]
    fn exploit_hits_limit_when_untrained() {
        let mut env = Building::with_rng(StdRng::seed_from_u64(2));
        let agent: QTableAgent<Building> =
            QTableAgent::with_rng(QTableAgentConfig::default(), StdRng::seed_from_u64(2));
        env.enter(2);
        assert_eq!(agent.exploit_from(&mut env, 2, 0), None);
        env.enter(5);
        assert_eq!(agent.exploit_from(&mut env, 5, 0), Some(0), "Already outside");
    }

    #[test]
    fn reset_forgets() {
        let (mut agent, _) = trained(10);
        assert!(!agent.get_q_table().is_empty());
        agent.reset();
        assert!(agent.get_q_table().is_empty());
        assert_eq!(agent.episode(), 0);
    }
}

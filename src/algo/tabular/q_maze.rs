use std::num::NonZeroU32;

use log::{debug, info, trace, warn};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::{
    assert_interval,
    decay::Annealing,
    exploration::{Choice, EpsilonGreedy},
    maze::{Cell, Dir, Maze, Pos, QTable, RewardTable, Rewards},
    MazeError,
};

use super::policy::{greedy_move, GreedyPolicy};

/// Configuration for the [`QMazeAgent`]
#[derive(Debug, Clone, PartialEq)]
pub struct QMazeAgentConfig {
    /// Learning rate
    pub alpha: f32,
    /// Discount factor
    pub gamma: f32,
    pub rewards: Rewards,
    /// Maximum moves per training episode and per greedy walk, `None` for no bound
    pub step_limit: Option<usize>,
}

impl Default for QMazeAgentConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.8,
            rewards: Rewards::default(),
            step_limit: Some(10_000),
        }
    }
}

/// How a training episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Goal,
    Hazard,
    /// The step limit ran out before a terminal cell was entered
    Truncated,
}

/// Summary of a single training episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Episode {
    pub outcome: Outcome,
    pub steps: usize,
}

/// Statistics of a [`QMazeAgent::train`] batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainReport {
    pub episodes: u32,
    pub steps: usize,
    pub goals: u32,
    pub hazards: u32,
    pub truncated: u32,
}

impl TrainReport {
    fn record(&mut self, episode: &Episode) {
        self.episodes += 1;
        self.steps += episode.steps;
        match episode.outcome {
            Outcome::Goal => self.goals += 1,
            Outcome::Hazard => self.hazards += 1,
            Outcome::Truncated => self.truncated += 1,
        }
    }

    pub fn average_steps(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.steps as f64 / self.episodes as f64
        }
    }
}

/// A Q-learning agent that solves a [`Maze`] by valuing its cells
///
/// The table holds one value per cell: the learned worth of *entering* that cell. Each
/// move from `s` to `s'` updates the destination,
///
/// Q(s') += alpha * (R(s') + gamma * max<sub>m</sub> Q(s' + m) - Q(s'))
///
/// where the lookahead ranges over the legal moves *from `s'`*, goals and hazards included,
/// and is zero only when `s'` has no legal move. Terminal values are written when the agent
/// enters them and are never looked up from inside them, since episodes stop there.
///
/// Exploration is epsilon greedy. Before episode `i` of an `n` episode [`train`](Self::train)
/// batch, epsilon becomes `round(1 - (i + 1) / n, 2)` unless that is zero, in which case it
/// keeps its last positive value.
pub struct QMazeAgent<R: Rng = StdRng> {
    maze: Maze,
    rewards: RewardTable,
    q_table: QTable,
    exploration: EpsilonGreedy,
    alpha: f32,
    gamma: f32,
    step_limit: Option<usize>,
    episode: u32,
    rng: R,
}

impl QMazeAgent {
    /// Initialize a new `QMazeAgent` with an entropy seeded generator
    ///
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn new(maze: Maze, config: QMazeAgentConfig) -> Self {
        Self::with_rng(maze, config, StdRng::from_entropy())
    }
}

impl<R: Rng> QMazeAgent<R> {
    /// Initialize a new `QMazeAgent` driven by `rng`
    ///
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn with_rng(maze: Maze, config: QMazeAgentConfig, rng: R) -> Self {
        assert_interval!(config.alpha, 0.0, 1.0);
        assert_interval!(config.gamma, 0.0, 1.0);
        Self {
            rewards: RewardTable::new(&maze, &config.rewards),
            q_table: QTable::new(&maze),
            maze,
            exploration: EpsilonGreedy::new(1.0),
            alpha: config.alpha,
            gamma: config.gamma,
            step_limit: config.step_limit,
            episode: 0,
            rng,
        }
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    /// Copy of the Q-table, one `Vec` per maze row
    pub fn snapshot(&self) -> Vec<Vec<f32>> {
        self.q_table.snapshot()
    }

    pub fn epsilon(&self) -> f32 {
        self.exploration.epsilon()
    }

    /// Episodes trained since construction or the last [`reset`](Self::reset)
    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Zero the Q-table and restore epsilon to 1
    pub fn reset(&mut self) {
        self.q_table.reset();
        self.exploration.reset();
        self.episode = 0;
    }

    /// Run `episodes` training episodes from the maze's start, annealing epsilon across the batch
    pub fn train(&mut self, episodes: u32) -> TrainReport {
        let mut report = TrainReport::default();
        let Some(n) = NonZeroU32::new(episodes) else {
            warn!("asked to train for zero episodes");
            return report;
        };

        let schedule = Annealing::new(n);
        for i in 0..episodes {
            self.exploration.anneal(&schedule, i);
            let episode = self.go();
            debug!(
                "episode {i} of {episodes}: {:?} after {} steps (epsilon {})",
                episode.outcome,
                episode.steps,
                self.exploration.epsilon()
            );
            report.record(&episode);
        }

        info!(
            "trained {} episodes: {} goals, {} hazards, {} truncated, {:.1} steps on average",
            report.episodes,
            report.goals,
            report.hazards,
            report.truncated,
            report.average_steps()
        );
        report
    }

    /// Run a single episode from the start cell with the current epsilon
    pub fn go(&mut self) -> Episode {
        let mut pos = self.maze.start();
        let mut steps = 0;
        let outcome = loop {
            match self.maze[pos] {
                Cell::Goal => break Outcome::Goal,
                Cell::Hazard => break Outcome::Hazard,
                _ => {}
            }
            if self.step_limit.is_some_and(|limit| steps >= limit) {
                warn!("episode {} truncated after {steps} steps", self.episode);
                break Outcome::Truncated;
            }

            let dir = self.act(pos);
            pos = self.learn(pos, dir);
            steps += 1;
        };

        self.episode += 1;
        Episode { outcome, steps }
    }

    /// Read-only greedy policy over the current Q-table
    pub fn policy(&self) -> GreedyPolicy<'_> {
        GreedyPolicy::new(&self.maze, &self.q_table, self.step_limit)
    }

    /// Extract the learned path from `from` to a terminal cell
    pub fn solve(&self, from: Pos) -> Result<Vec<Dir>, MazeError> {
        self.policy().walk(from)
    }

    fn act(&mut self, pos: Pos) -> Dir {
        match self.exploration.choose(&mut self.rng) {
            Choice::Explore => *self
                .maze
                .legal_moves(pos)
                .choose(&mut self.rng)
                .expect("Non-terminal cells always have a legal move"),
            Choice::Exploit => greedy_move(&self.maze, &self.q_table, pos)
                .expect("Non-terminal cells always have a legal move"),
        }
    }

    /// Update the value of the cell `dir` leads to from `pos`
    ///
    /// **Returns** the destination
    fn learn(&mut self, pos: Pos, dir: Dir) -> Pos {
        let next = self
            .maze
            .neighbor(pos, dir)
            .expect("Legal moves stay inside the maze");
        let reward = self
            .rewards
            .get(next)
            .expect("Legal moves never enter obstacles");

        // terminal destinations look ahead too; only an empty move set counts as zero
        let max_next_q = self
            .maze
            .legal_moves(next)
            .into_iter()
            .filter_map(|m| self.maze.neighbor(next, m))
            .map(|cell| self.q_table[cell])
            .max_by(f32::total_cmp)
            .unwrap_or(0.0);

        let q_value = self.q_table[next];
        let new_q_value = q_value + self.alpha * (reward + self.gamma * max_next_q - q_value);
        trace!("Q{next:?}: {q_value} -> {new_q_value} moving {dir} from {pos:?}");
        self.q_table[next] = new_q_value;

        next
    }
}

pub mod policy;
pub mod q_maze;
pub mod q_table;

pub use policy::GreedyPolicy;
pub use q_maze::{Episode, Outcome, QMazeAgent, QMazeAgentConfig, TrainReport};
pub use q_table::{QTableAgent, QTableAgentConfig};

/// A trait for state and action types that can be used as keys in a [`HashMap`](std::collections::HashMap)
pub trait Hashable: Copy + Eq + std::hash::Hash {}

impl<T> Hashable for T where T: Copy + Eq + std::hash::Hash {}

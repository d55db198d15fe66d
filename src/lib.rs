/// Implemented RL algorithms
pub mod algo;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Environment
pub mod env;

/// Exploration policies
pub mod exploration;

/// Testing environments
pub mod gym;

/// Grid mazes and the tables laid over them
pub mod maze;

mod error;
mod util;

pub use algo::tabular::{GreedyPolicy, QMazeAgent, QMazeAgentConfig};
pub use error::MazeError;

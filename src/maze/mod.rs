mod grid;
mod table;

pub use grid::{Cell, Dir, Maze, Pos};
pub use table::{QTable, RewardTable, Rewards, Table};

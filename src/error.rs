use thiserror::Error;

use crate::maze::{Dir, Pos};

/// Errors raised while building or walking a [`Maze`](crate::maze::Maze)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MazeError {
    #[error("layout has no rows")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown cell symbol {symbol:?} at {pos:?}")]
    UnknownSymbol { symbol: char, pos: Pos },

    #[error("layout has no start cell")]
    MissingStart,

    #[error("layout has more than one start cell")]
    MultipleStarts,

    #[error("start {0:?} is outside the grid")]
    StartOutOfBounds(Pos),

    #[error("start {0:?} is an obstacle")]
    StartOnObstacle(Pos),

    #[error("start {0:?} has no open neighbour")]
    StartEnclosed(Pos),

    #[error("cannot move {dir} from {pos:?}")]
    IllegalMove { pos: Pos, dir: Dir },

    #[error("no terminal cell reached within {0} steps")]
    StepLimit(usize),
}

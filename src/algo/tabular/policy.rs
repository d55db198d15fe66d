use log::warn;

use crate::{
    maze::{Cell, Dir, Maze, Pos, QTable},
    MazeError,
};

/// The legal move from `pos` whose destination has the highest value
///
/// Moves are compared in `N, S, E, W` order and a later move replaces the current best
/// when its value is greater *or equal*, so ties go to the last tied direction.
pub(crate) fn greedy_move(maze: &Maze, q_table: &QTable, pos: Pos) -> Option<Dir> {
    maze.legal_moves(pos)
        .into_iter()
        .filter_map(|dir| Some((dir, q_table[maze.neighbor(pos, dir)?])))
        .fold(None, |best, (dir, value)| match best {
            Some((_, best_value)) if value < best_value => best,
            _ => Some((dir, value)),
        })
        .map(|(dir, _)| dir)
}

/// Read-only greedy view of a trained Q-table
///
/// Obtained from [`QMazeAgent::policy`](super::QMazeAgent::policy); the agent cannot train
/// while a policy borrows it.
#[derive(Debug, Clone, Copy)]
pub struct GreedyPolicy<'a> {
    maze: &'a Maze,
    q_table: &'a QTable,
    step_limit: Option<usize>,
}

impl<'a> GreedyPolicy<'a> {
    pub fn new(maze: &'a Maze, q_table: &'a QTable, step_limit: Option<usize>) -> Self {
        Self {
            maze,
            q_table,
            step_limit,
        }
    }

    /// The move the policy takes from `pos`, if any is legal
    pub fn best_move(&self, pos: Pos) -> Option<Dir> {
        greedy_move(self.maze, self.q_table, pos)
    }

    /// Walk greedily from `from` until a goal or hazard is entered
    ///
    /// **Returns** the moves in order; empty if `from` is already terminal.
    ///
    /// Without a step limit a Q-table that cycles, or a maze whose terminals are
    /// unreachable, makes this loop forever.
    pub fn walk(&self, from: Pos) -> Result<Vec<Dir>, MazeError> {
        match self.maze.cell(from) {
            None => return Err(MazeError::StartOutOfBounds(from)),
            Some(Cell::Obstacle) => return Err(MazeError::StartOnObstacle(from)),
            Some(_) => {}
        }

        let mut pos = from;
        let mut path = Vec::new();
        while !self.maze.is_terminal(pos) {
            if let Some(limit) = self.step_limit.filter(|&limit| path.len() >= limit) {
                warn!("greedy walk from {from:?} gave up after {limit} steps");
                return Err(MazeError::StepLimit(limit));
            }

            let dir = self
                .best_move(pos)
                .ok_or(MazeError::StartEnclosed(from))?;
            pos = self.maze.step(pos, dir)?;
            path.push(dir);
        }

        Ok(path)
    }
}

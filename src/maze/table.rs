use std::ops::{Index, IndexMut};

use super::{Cell, Maze, Pos};

/// Row-major storage aligned with a maze's coordinate space
#[derive(Debug, Clone, PartialEq)]
pub struct Table<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Clone> Table<T> {
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Overwrite every entry with `value`
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Copy the table out as one `Vec` per row
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.data.chunks(self.cols).map(<[T]>::to_vec).collect()
    }
}

impl<T> Table<T> {
    pub(crate) fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, pos: Pos) -> Option<&T> {
        self.contains(pos).then(|| &self.data[pos.0 * self.cols + pos.1])
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.0 < self.rows && pos.1 < self.cols
    }

    /// Iterate over every entry with its position, row by row
    pub fn iter(&self) -> impl Iterator<Item = (Pos, &T)> {
        let cols = self.cols;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, value)| ((i / cols, i % cols), value))
    }
}

impl<T> Index<Pos> for Table<T> {
    type Output = T;

    fn index(&self, pos: Pos) -> &Self::Output {
        assert!(self.contains(pos), "{pos:?} is outside the table");
        &self.data[pos.0 * self.cols + pos.1]
    }
}

impl<T> IndexMut<Pos> for Table<T> {
    fn index_mut(&mut self, pos: Pos) -> &mut Self::Output {
        assert!(self.contains(pos), "{pos:?} is outside the table");
        &mut self.data[pos.0 * self.cols + pos.1]
    }
}

/// Scalar rewards for entering each kind of traversable cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rewards {
    pub open: f32,
    pub goal: f32,
    pub hazard: f32,
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            open: -0.04,
            goal: 1.0,
            hazard: -1.0,
        }
    }
}

/// Reward for entering each cell, undefined for obstacles
#[derive(Debug, Clone, PartialEq)]
pub struct RewardTable {
    table: Table<Option<f32>>,
}

impl RewardTable {
    pub fn new(maze: &Maze, rewards: &Rewards) -> Self {
        let data = maze
            .cells()
            .iter()
            .map(|(_, cell)| match cell {
                Cell::Obstacle => None,
                Cell::Open => Some(rewards.open),
                Cell::Goal => Some(rewards.goal),
                Cell::Hazard => Some(rewards.hazard),
            })
            .collect();

        Self {
            table: Table::from_vec(maze.rows(), maze.cols(), data),
        }
    }

    pub fn get(&self, pos: Pos) -> Option<f32> {
        self.table.get(pos).copied().flatten()
    }
}

/// Learned value of entering each cell
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    table: Table<f32>,
}

impl QTable {
    /// A table of zeros shaped like `maze`
    pub fn new(maze: &Maze) -> Self {
        Self {
            table: Table::filled(maze.rows(), maze.cols(), 0.0),
        }
    }

    pub fn reset(&mut self) {
        self.table.fill(0.0);
    }

    /// Copy the values out as a two-dimensional array aligned with the maze
    pub fn snapshot(&self) -> Vec<Vec<f32>> {
        self.table.to_rows()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pos, f32)> + '_ {
        self.table.iter().map(|(pos, &value)| (pos, value))
    }
}

impl Index<Pos> for QTable {
    type Output = f32;

    fn index(&self, pos: Pos) -> &Self::Output {
        &self.table[pos]
    }
}

impl IndexMut<Pos> for QTable {
    fn index_mut(&mut self, pos: Pos) -> &mut Self::Output {
        &mut self.table[pos]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maze() -> Maze {
        Maze::new(&["X G", "  E"], (1, 0)).unwrap()
    }

    #[test]
    fn table_layout() {
        let mut table = Table::filled(2, 3, 0);
        table[(1, 2)] = 5;
        assert_eq!(table.to_rows(), vec![vec![0, 0, 0], vec![0, 0, 5]]);
        assert_eq!(table.get((2, 0)), None, "Out of bounds is None");
        assert_eq!(table.iter().nth(5), Some(((1, 2), &5)));
    }

    #[test]
    fn reward_table_from_maze() {
        let rewards = RewardTable::new(&maze(), &Rewards::default());
        assert_eq!(rewards.get((0, 0)), None, "Obstacles have no reward");
        assert_eq!(rewards.get((0, 1)), Some(-0.04));
        assert_eq!(rewards.get((0, 2)), Some(1.0));
        assert_eq!(rewards.get((1, 2)), Some(-1.0));
        assert_eq!(rewards.get((5, 5)), None);
    }

    #[test]
    fn q_table_reset() {
        let maze = maze();
        let mut q = QTable::new(&maze);
        q[(0, 1)] = 0.3;
        q[(1, 1)] = -0.2;
        assert_eq!(q.snapshot(), vec![vec![0.0, 0.3, 0.0], vec![0.0, -0.2, 0.0]]);

        q.reset();
        assert!(q.iter().all(|(_, v)| v == 0.0), "All zero after reset");
    }
}

use std::{fmt, ops::Index};

use strum::{EnumIter, IntoEnumIterator, VariantArray};

use crate::MazeError;

use super::Table;

/// Cell coordinates as `(row, column)`
pub type Pos = (usize, usize);

/// The contents of a single maze cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Obstacle,
    Open,
    Goal,
    Hazard,
}

impl Cell {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'X' => Some(Cell::Obstacle),
            ' ' => Some(Cell::Open),
            'G' => Some(Cell::Goal),
            'E' => Some(Cell::Hazard),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Cell::Obstacle => 'X',
            Cell::Open => ' ',
            Cell::Goal => 'G',
            Cell::Hazard => 'E',
        }
    }

    /// Goal and hazard cells end a walk
    pub fn is_terminal(self) -> bool {
        matches!(self, Cell::Goal | Cell::Hazard)
    }
}

/// A compass move
///
/// The declaration order `N, S, E, W` is the iteration order used everywhere moves are
/// enumerated, and therefore decides greedy ties.
#[derive(EnumIter, VariantArray, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    North,
    South,
    East,
    West,
}

impl Dir {
    /// `(row, column)` offset of a single move
    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::North => (-1, 0),
            Dir::South => (1, 0),
            Dir::East => (0, 1),
            Dir::West => (0, -1),
        }
    }

    pub fn from_delta(delta: (isize, isize)) -> Option<Self> {
        Dir::iter().find(|dir| dir.delta() == delta)
    }

    pub fn symbol(self) -> char {
        match self {
            Dir::North => 'N',
            Dir::South => 'S',
            Dir::East => 'E',
            Dir::West => 'W',
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// An immutable rectangular maze with a fixed start cell
///
/// Layouts are rows of single-character symbols: `X` obstacle, space open, `G` goal and
/// `E` hazard.
#[derive(Debug, Clone, PartialEq)]
pub struct Maze {
    cells: Table<Cell>,
    start: Pos,
}

impl Maze {
    /// Build a maze from its rows and an explicit start cell
    pub fn new<S: AsRef<str>>(rows: &[S], start: Pos) -> Result<Self, MazeError> {
        let cells = parse(rows, |_, symbol| Cell::from_symbol(symbol))?;
        Self::validated(cells, start)
    }

    /// Build a maze whose start cell is marked with `S` in the layout
    ///
    /// The start cell itself is open.
    pub fn from_layout<S: AsRef<str>>(rows: &[S]) -> Result<Self, MazeError> {
        let mut starts = Vec::new();
        let cells = parse(rows, |pos, symbol| match symbol {
            'S' => {
                starts.push(pos);
                Some(Cell::Open)
            }
            _ => Cell::from_symbol(symbol),
        })?;

        match starts[..] {
            [start] => Self::validated(cells, start),
            [] => Err(MazeError::MissingStart),
            _ => Err(MazeError::MultipleStarts),
        }
    }

    fn validated(cells: Table<Cell>, start: Pos) -> Result<Self, MazeError> {
        let maze = Self { cells, start };
        match maze.cell(start) {
            None => Err(MazeError::StartOutOfBounds(start)),
            Some(Cell::Obstacle) => Err(MazeError::StartOnObstacle(start)),
            Some(cell) if !cell.is_terminal() && maze.legal_moves(start).is_empty() => {
                Err(MazeError::StartEnclosed(start))
            }
            Some(_) => Ok(maze),
        }
    }

    pub fn rows(&self) -> usize {
        self.cells.rows()
    }

    pub fn cols(&self) -> usize {
        self.cells.cols()
    }

    pub fn start(&self) -> Pos {
        self.start
    }

    pub fn cells(&self) -> &Table<Cell> {
        &self.cells
    }

    /// The cell at `pos`, or `None` outside the grid
    pub fn cell(&self, pos: Pos) -> Option<Cell> {
        self.cells.get(pos).copied()
    }

    pub fn is_terminal(&self, pos: Pos) -> bool {
        self.cell(pos).is_some_and(Cell::is_terminal)
    }

    /// Destination of `dir` from `pos` if it stays inside the grid
    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dr, dc) = dir.delta();
        let next = (pos.0.checked_add_signed(dr)?, pos.1.checked_add_signed(dc)?);
        self.cells.contains(next).then_some(next)
    }

    /// Directions from `pos` that stay inside the grid and avoid obstacles, in `N, S, E, W` order
    pub fn legal_moves(&self, pos: Pos) -> Vec<Dir> {
        Dir::iter()
            .filter(|&dir| {
                self.neighbor(pos, dir)
                    .is_some_and(|next| self.cells[next] != Cell::Obstacle)
            })
            .collect()
    }

    /// Apply a single move
    ///
    /// Fails with [`MazeError::IllegalMove`] unless `dir` is one of [`legal_moves`](Self::legal_moves).
    pub fn step(&self, pos: Pos, dir: Dir) -> Result<Pos, MazeError> {
        self.neighbor(pos, dir)
            .filter(|&next| self.cells[next] != Cell::Obstacle)
            .ok_or(MazeError::IllegalMove { pos, dir })
    }

    /// Replay a sequence of moves from `from`, returning the final cell
    pub fn follow(&self, from: Pos, moves: &[Dir]) -> Result<Pos, MazeError> {
        moves
            .iter()
            .try_fold(from, |pos, &dir| self.step(pos, dir))
    }
}

impl Index<Pos> for Maze {
    type Output = Cell;

    fn index(&self, pos: Pos) -> &Self::Output {
        &self.cells[pos]
    }
}

fn parse<S, F>(rows: &[S], mut cell: F) -> Result<Table<Cell>, MazeError>
where
    S: AsRef<str>,
    F: FnMut(Pos, char) -> Option<Cell>,
{
    let width = rows
        .first()
        .map(|row| row.as_ref().chars().count())
        .filter(|&width| width > 0)
        .ok_or(MazeError::Empty)?;

    let mut data = Vec::with_capacity(rows.len() * width);
    for (r, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        let found = row.chars().count();
        if found != width {
            return Err(MazeError::Ragged {
                row: r,
                expected: width,
                found,
            });
        }

        for (c, symbol) in row.chars().enumerate() {
            let pos = (r, c);
            data.push(cell(pos, symbol).ok_or(MazeError::UnknownSymbol { symbol, pos })?);
        }
    }

    Ok(Table::from_vec(rows.len(), width, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: [&str; 5] = ["XXXXXX", "X   GX", "X X EX", "X    X", "XXXXXX"];

    #[test]
    fn dir_delta_bijection() {
        for &dir in Dir::VARIANTS {
            assert_eq!(Dir::from_delta(dir.delta()), Some(dir));
        }
        assert_eq!(Dir::from_delta((1, 1)), None);
        assert_eq!(
            Dir::VARIANTS,
            &[Dir::North, Dir::South, Dir::East, Dir::West],
            "Iteration order is N, S, E, W"
        );
    }

    #[test]
    fn cell_symbols() {
        for cell in [Cell::Obstacle, Cell::Open, Cell::Goal, Cell::Hazard] {
            assert_eq!(Cell::from_symbol(cell.symbol()), Some(cell));
        }
        assert_eq!(Cell::from_symbol('S'), None, "Start marker is not a cell");
    }

    #[test]
    fn legal_moves_avoid_walls_and_edges() {
        let maze = Maze::new(&GRID, (2, 1)).unwrap();
        assert_eq!(maze.legal_moves((2, 1)), vec![Dir::North, Dir::South]);
        assert_eq!(
            maze.legal_moves((1, 3)),
            vec![Dir::South, Dir::East, Dir::West]
        );

        let open = Maze::new(&["  ", "  "], (0, 0)).unwrap();
        assert_eq!(open.legal_moves((0, 0)), vec![Dir::South, Dir::East]);
        assert_eq!(open.legal_moves((1, 1)), vec![Dir::North, Dir::West]);
    }

    #[test]
    fn legal_moves_never_leave_open_space() {
        let maze = Maze::new(&GRID, (2, 1)).unwrap();
        for (pos, cell) in maze.cells().iter() {
            if *cell == Cell::Obstacle {
                continue;
            }
            for dir in maze.legal_moves(pos) {
                let next = maze.neighbor(pos, dir).expect("legal move stays in bounds");
                assert_ne!(maze[next], Cell::Obstacle, "{pos:?} {dir} hits a wall");
            }
        }
    }

    #[test]
    fn step_rejects_illegal_moves() {
        let maze = Maze::new(&GRID, (2, 1)).unwrap();
        assert_eq!(maze.step((2, 1), Dir::North), Ok((1, 1)));
        assert_eq!(
            maze.step((2, 1), Dir::East),
            Err(MazeError::IllegalMove {
                pos: (2, 1),
                dir: Dir::East
            })
        );

        let open = Maze::new(&[" G"], (0, 0)).unwrap();
        assert!(open.step((0, 0), Dir::West).is_err(), "Leaving the grid");
        assert_eq!(open.follow((0, 0), &[Dir::East]), Ok((0, 1)));
    }

    #[test]
    fn terminal_cells() {
        let maze = Maze::new(&GRID, (2, 1)).unwrap();
        assert!(maze.is_terminal((1, 4)));
        assert!(maze.is_terminal((2, 4)));
        assert!(!maze.is_terminal((2, 1)));
        assert!(!maze.is_terminal((0, 0)));
        assert!(!maze.is_terminal((9, 9)));
    }

    #[test]
    fn configuration_errors() {
        let empty: [&str; 0] = [];
        assert_eq!(Maze::new(&empty, (0, 0)), Err(MazeError::Empty));
        assert_eq!(
            Maze::new(&["  ", "   "], (0, 0)),
            Err(MazeError::Ragged {
                row: 1,
                expected: 2,
                found: 3
            })
        );
        assert_eq!(
            Maze::new(&[" ?"], (0, 0)),
            Err(MazeError::UnknownSymbol {
                symbol: '?',
                pos: (0, 1)
            })
        );
        assert_eq!(
            Maze::new(&GRID, (7, 1)),
            Err(MazeError::StartOutOfBounds((7, 1)))
        );
        assert_eq!(
            Maze::new(&GRID, (0, 0)),
            Err(MazeError::StartOnObstacle((0, 0)))
        );
        assert!(
            Maze::new(&["XXX", "X X", "XGX"], (1, 1)).is_ok(),
            "Start next to the goal is fine"
        );
        assert!(
            Maze::new(&["XXX", "XGX", "XXX"], (1, 1)).is_ok(),
            "Terminal start needs no moves"
        );
        assert_eq!(
            Maze::new(&["XXX", "X X", "XXX"], (1, 1)),
            Err(MazeError::StartEnclosed((1, 1)))
        );
    }

    #[test]
    fn layout_with_start_marker() {
        let maze = Maze::from_layout(&["XXXX", "XS X", "X GX", "XXXX"]).unwrap();
        assert_eq!(maze.start(), (1, 1));
        assert_eq!(maze[(1, 1)], Cell::Open);

        assert_eq!(
            Maze::from_layout(&["  G"]),
            Err(MazeError::MissingStart)
        );
        assert_eq!(
            Maze::from_layout(&["S SG"]),
            Err(MazeError::MultipleStarts)
        );
        assert_eq!(
            Maze::new(&["S G"], (0, 0)),
            Err(MazeError::UnknownSymbol {
                symbol: 'S',
                pos: (0, 0)
            }),
            "Start marker only allowed in from_layout"
        );
    }
}

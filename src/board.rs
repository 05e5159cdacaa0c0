use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// A `(row, col)` coordinate, both zero-based.
pub type Point = (usize, usize);

/// Square grid of stones. Pure storage: it knows adjacency but no rules.
///
/// Serialized as a list of rows, each cell `"black"`, `"white"` or `null`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Option<Color>>>", into = "Vec<Vec<Option<Color>>>")]
pub struct Board {
    size: usize,
    cells: Vec<Option<Color>>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size
    }

    /// Stone at `(row, col)`; `None` for empty or off-board points.
    pub fn get(&self, row: usize, col: usize) -> Option<Color> {
        if !self.in_bounds(row, col) {
            return None;
        }
        self.cells[self.idx(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, stone: Option<Color>) -> Result<(), GameError> {
        if !self.in_bounds(row, col) {
            return Err(GameError::OutOfBounds { row, col });
        }
        let i = self.idx(row, col);
        self.cells[i] = stone;
        Ok(())
    }

    /// In-bounds orthogonal neighbors (N, S, W, E order), at most four.
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = Point> + use<> {
        let s = self.size;
        let mut v = Vec::with_capacity(4);
        if row > 0 {
            v.push((row - 1, col));
        }
        if row + 1 < s {
            v.push((row + 1, col));
        }
        if col > 0 {
            v.push((row, col - 1));
        }
        if col + 1 < s {
            v.push((row, col + 1));
        }
        v.into_iter()
    }

    /// All points in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        let s = self.size;
        (0..s).flat_map(move |row| (0..s).map(move |col| (row, col)))
    }

    pub fn empty_points(&self) -> Vec<Point> {
        self.points()
            .filter(|&(r, c)| self.get(r, c).is_none())
            .collect()
    }

    pub fn count(&self, color: Color) -> usize {
        self.cells.iter().filter(|c| **c == Some(color)).count()
    }

    pub fn rows(&self) -> Vec<Vec<Option<Color>>> {
        self.cells.chunks(self.size.max(1)).map(<[_]>::to_vec).collect()
    }
}

impl From<Board> for Vec<Vec<Option<Color>>> {
    fn from(board: Board) -> Self {
        board.rows()
    }
}

impl TryFrom<Vec<Vec<Option<Color>>>> for Board {
    type Error = String;

    fn try_from(rows: Vec<Vec<Option<Color>>>) -> Result<Self, Self::Error> {
        let size = rows.len();
        if size == 0 {
            return Err("board has no rows".into());
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != size) {
            return Err(format!("row {bad} does not have {size} cells"));
        }
        Ok(Board {
            size,
            cells: rows.into_iter().flatten().collect(),
        })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                let ch = match self.get(row, col) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

//! Connected groups and their liberties, derived on demand from a [`Board`].
//!
//! Nothing here is cached: each call flood-fills from its seed point, so a
//! caller that needs the same group twice in one move should keep the result.

use std::collections::BTreeSet;

use crate::board::{Board, Color, Point};

/// A maximal set of same-colored, orthogonally connected stones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub color: Color,
    pub members: BTreeSet<Point>,
    pub liberties: BTreeSet<Point>,
}

impl Group {
    pub fn is_captured(&self) -> bool {
        self.liberties.is_empty()
    }

    pub fn in_atari(&self) -> bool {
        self.liberties.len() == 1
    }

    pub fn contains(&self, pt: Point) -> bool {
        self.members.contains(&pt)
    }
}

/// Flood-fill the group containing `(row, col)`.
///
/// Fails with `EmptyCell` when the point holds no stone.
pub fn group_at(board: &Board, row: usize, col: usize) -> Result<Group, GroupError> {
    if !board.in_bounds(row, col) {
        return Err(GroupError::OutOfBounds { row, col });
    }
    let color = board.get(row, col).ok_or(GroupError::EmptyCell { row, col })?;

    let mut members = BTreeSet::new();
    let mut liberties = BTreeSet::new();
    let mut stack = vec![(row, col)];

    while let Some((r, c)) = stack.pop() {
        if !members.insert((r, c)) {
            continue;
        }
        for (nr, nc) in board.neighbors(r, c) {
            match board.get(nr, nc) {
                None => {
                    liberties.insert((nr, nc));
                }
                Some(n) if n == color && !members.contains(&(nr, nc)) => stack.push((nr, nc)),
                _ => {}
            }
        }
    }

    Ok(Group {
        color,
        members,
        liberties,
    })
}

/// Like [`group_at`], but `None` for empty or off-board points.
pub fn try_group_at(board: &Board, row: usize, col: usize) -> Option<Group> {
    group_at(board, row, col).ok()
}

/// Every group on the board, each reported once.
pub fn all_groups(board: &Board) -> Vec<Group> {
    let mut seen = BTreeSet::new();
    let mut groups = Vec::new();
    for (r, c) in board.points() {
        if seen.contains(&(r, c)) {
            continue;
        }
        if let Some(group) = try_group_at(board, r, c) {
            seen.extend(group.members.iter().copied());
            groups.push(group);
        }
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    /// Seed point holds no stone
    EmptyCell { row: usize, col: usize },
    OutOfBounds { row: usize, col: usize },
}

impl std::error::Error for GroupError {}

impl std::fmt::Display for GroupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupError::EmptyCell { row, col } => write!(f, "no stone at ({row}, {col})"),
            GroupError::OutOfBounds { row, col } => write!(f, "({row}, {col}) is off the board"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(size: usize, black: &[Point], white: &[Point]) -> Board {
        let mut board = Board::new(size);
        for &(r, c) in black {
            board.set(r, c, Some(Color::Black)).unwrap();
        }
        for &(r, c) in white {
            board.set(r, c, Some(Color::White)).unwrap();
        }
        board
    }

    #[test]
    fn test_single_stone_has_four_liberties() {
        let board = board_with(9, &[(4, 4)], &[]);
        let group = group_at(&board, 4, 4).unwrap();
        assert_eq!(group.members.len(), 1);
        assert_eq!(group.liberties.len(), 4);
        assert_eq!(group.color, Color::Black);
    }

    #[test]
    fn test_empty_cell() {
        let board = Board::new(9);
        assert_eq!(
            group_at(&board, 2, 2),
            Err(GroupError::EmptyCell { row: 2, col: 2 })
        );
    }

    #[test]
    fn test_shared_liberties_deduplicated() {
        // Corner L-shape: (1, 1) touches two members but counts once.
        let board = board_with(9, &[(0, 1), (1, 0), (0, 0)], &[]);
        let group = group_at(&board, 0, 0).unwrap();
        assert_eq!(group.members.len(), 3);
        assert_eq!(
            group.liberties,
            BTreeSet::from([(0, 2), (1, 1), (2, 0)])
        );
    }

    #[test]
    fn test_opponent_stones_block_liberties() {
        let board = board_with(9, &[(0, 0)], &[(0, 1)]);
        let group = group_at(&board, 0, 0).unwrap();
        assert!(group.in_atari());
        assert_eq!(group.liberties, BTreeSet::from([(1, 0)]));
    }

    #[test]
    fn test_seed_does_not_change_result() {
        let board = board_with(9, &[(3, 3), (3, 4), (4, 4), (5, 4)], &[(2, 3)]);
        let a = group_at(&board, 3, 3).unwrap();
        let b = group_at(&board, 5, 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_all_groups_partition_stones() {
        let board = board_with(9, &[(0, 0), (0, 1), (5, 5)], &[(1, 0), (8, 8)]);
        let groups = all_groups(&board);
        assert_eq!(groups.len(), 4);
        let total: usize = groups.iter().map(|g| g.members.len()).sum();
        assert_eq!(total, 5);
    }
}

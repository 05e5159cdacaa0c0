//! Move legality: occupancy, suicide and simple ko.
//!
//! [`validate`] is a pure predicate. It simulates placements on a scratch copy
//! of the board using the same capture resolution the capture engine applies,
//! so "legal" here always means "applies cleanly" there.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Color, Point};
use crate::error::GameError;
use crate::group::try_group_at;
use crate::session::{GameSession, GameStatus};

/// A single action by one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Move {
    Place { row: usize, col: usize, color: Color },
    Pass { color: Color },
}

impl Move {
    pub fn color(&self) -> Color {
        match *self {
            Move::Place { color, .. } | Move::Pass { color } => color,
        }
    }

    pub fn point(&self) -> Option<Point> {
        match *self {
            Move::Place { row, col, .. } => Some((row, col)),
            Move::Pass { .. } => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Place { row, col, color } => write!(f, "{color} ({row}, {col})"),
            Move::Pass { color } => write!(f, "{color} pass"),
        }
    }
}

/// Opposing groups left without liberties by a stone just placed at `pt`.
///
/// All groups are found against the board before any removal, and a group
/// touching the stone on several sides is reported once.
pub fn captured_by(board: &Board, pt: Point, color: Color) -> Vec<Point> {
    let mut captured = BTreeSet::new();
    for (nr, nc) in board.neighbors(pt.0, pt.1) {
        if board.get(nr, nc) != Some(color.opponent()) || captured.contains(&(nr, nc)) {
            continue;
        }
        if let Some(group) = try_group_at(board, nr, nc) {
            if group.is_captured() {
                captured.extend(group.members);
            }
        }
    }
    captured.into_iter().collect()
}

/// Place `color` at `pt` and remove what it captures. Returns the removed points.
///
/// The caller is responsible for bounds and occupancy; suicide is not checked.
pub fn place_and_capture(
    board: &mut Board,
    pt: Point,
    color: Color,
) -> Result<Vec<Point>, GameError> {
    board.set(pt.0, pt.1, Some(color))?;
    let captured = captured_by(board, pt, color);
    for &(r, c) in &captured {
        board.set(r, c, None)?;
    }
    Ok(captured)
}

/// Check `mv` against `session` without changing anything.
///
/// Rules are applied in order and the first failure wins: game over, turn,
/// bounds, occupancy, suicide, ko.
pub fn validate(session: &GameSession, mv: &Move) -> Result<(), GameError> {
    if !matches!(session.status, GameStatus::Active) {
        return Err(GameError::GameOver);
    }
    if mv.color() != session.current_player {
        return Err(GameError::NotYourTurn);
    }
    match *mv {
        Move::Pass { .. } => Ok(()),
        Move::Place { row, col, color } => {
            validate_placement(&session.board, session.previous_board.as_ref(), row, col, color)
        }
    }
}

/// Board-level part of [`validate`]: bounds, occupancy, suicide and ko.
pub fn validate_placement(
    board: &Board,
    previous: Option<&Board>,
    row: usize,
    col: usize,
    color: Color,
) -> Result<(), GameError> {
    if !board.in_bounds(row, col) {
        return Err(GameError::OutOfBounds { row, col });
    }
    if board.get(row, col).is_some() {
        return Err(GameError::Occupied { row, col });
    }

    let mut scratch = board.clone();
    place_and_capture(&mut scratch, (row, col), color)?;

    // Captures were already removed, so zero liberties here is real suicide.
    let own = try_group_at(&scratch, row, col).ok_or(GameError::Suicide { row, col })?;
    if own.is_captured() {
        return Err(GameError::Suicide { row, col });
    }

    if previous.is_some_and(|prev| *prev == scratch) {
        return Err(GameError::KoViolation { row, col });
    }
    Ok(())
}

/// Every legal placement for `color` on the session's board, row-major.
pub fn legal_placements(session: &GameSession, color: Color) -> Vec<Point> {
    session
        .board
        .empty_points()
        .into_iter()
        .filter(|&(row, col)| validate(session, &Move::Place { row, col, color }).is_ok())
        .collect()
}

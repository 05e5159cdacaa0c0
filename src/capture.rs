//! Applying a validated move to a session.
//!
//! This is the only place board contents, capture counters, the pass counter
//! and the ko snapshot change. Callers must run [`crate::rules::validate`] first.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{Color, Point};
use crate::constants::PASSES_TO_END;
use crate::error::GameError;
use crate::rules::{Move, place_and_capture};
use crate::session::{EndReason, GameSession, GameStatus, HUMAN_COLOR, Outcome};

/// One accepted move and the stones it removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    #[serde(rename = "move")]
    pub mv: Move,
    pub captured: usize,
}

/// What a single [`apply`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureDelta {
    /// Opposing stones removed from the board
    pub removed: Vec<Point>,
    /// Whether this move ended the game
    pub finished: bool,
}

impl CaptureDelta {
    pub fn count(&self) -> usize {
        self.removed.len()
    }
}

/// Apply `mv`, which must already have passed validation.
///
/// On error the session is left as it was: the board is only swapped in after
/// the placement has been fully resolved on a copy.
pub fn apply(session: &mut GameSession, mv: &Move) -> Result<CaptureDelta, GameError> {
    let before = session.board.clone();
    let mut delta = CaptureDelta::default();

    match *mv {
        Move::Place { row, col, color } => {
            let mut next = session.board.clone();
            delta.removed = place_and_capture(&mut next, (row, col), color)?;
            session.board = next;
            session.consecutive_passes = 0;
            credit_captures(session, color, delta.count());
            if delta.count() > 0 {
                debug!(game_id = session.id, %color, row, col, captured = delta.count(), "captured stones");
            }
        }
        Move::Pass { .. } => {
            session.consecutive_passes += 1;
        }
    }

    session.previous_board = Some(before);
    session.history.push(MoveRecord {
        mv: *mv,
        captured: delta.count(),
    });
    session.current_player = session.current_player.opponent();

    if session.consecutive_passes >= PASSES_TO_END {
        finish(session, Outcome::by_captures(session), EndReason::Passes);
        delta.finished = true;
    }
    Ok(delta)
}

fn credit_captures(session: &mut GameSession, mover: Color, count: usize) {
    if mover == HUMAN_COLOR {
        session.captured_by_human += count;
    } else {
        session.captured_by_ai += count;
    }
}

/// Freeze the session with the given result.
pub(crate) fn finish(session: &mut GameSession, outcome: Outcome, reason: EndReason) {
    session.status = GameStatus::Finished;
    session.winner = Some(outcome);
    session.end_reason = Some(reason);
}

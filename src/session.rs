//! One game's lifecycle: turn order, the automated reply, and termination.
//!
//! The human always plays black and the automated opponent white. A session
//! changes only through [`GameSession::apply_move`] and [`GameSession::resign`];
//! once finished, every further request is rejected with `GameOver`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::{Board, Color};
use crate::capture::{self, MoveRecord, finish};
use crate::config::check_board_size;
use crate::constants::PASSES_TO_END;
use crate::error::GameError;
use crate::rules::{Move, validate};
use crate::strategy::Opponent;

/// Side driven by the caller.
pub const HUMAN_COLOR: Color = Color::Black;

/// Side driven by the [`Opponent`].
pub const AI_COLOR: Color = Color::White;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Active,
    Finished,
}

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Black,
    White,
    /// Equal captures; rendered as no winner
    #[serde(rename = "none")]
    Draw,
}

impl Outcome {
    pub fn won_by(color: Color) -> Self {
        match color {
            Color::Black => Outcome::Black,
            Color::White => Outcome::White,
        }
    }

    /// Capture-count scoring: more stones captured wins, equal counts draw.
    pub fn by_captures(session: &GameSession) -> Self {
        let black = session.captures_by(Color::Black);
        let white = session.captures_by(Color::White);
        match black.cmp(&white) {
            std::cmp::Ordering::Greater => Outcome::Black,
            std::cmp::Ordering::Less => Outcome::White,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    /// Two consecutive passes
    Passes,
    Resignation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub id: u64,
    /// Identity of the caller that created the game
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub board: Board,
    pub current_player: Color,
    pub status: GameStatus,
    /// Stones the human (black) removed from the board
    pub captured_by_human: usize,
    /// Stones the opponent (white) removed from the board
    pub captured_by_ai: usize,
    /// Set exactly when `status` is `Finished`
    pub winner: Option<Outcome>,
    pub end_reason: Option<EndReason>,
    pub consecutive_passes: u8,
    /// Board as it was before the last applied move; a placement may not recreate it
    pub previous_board: Option<Board>,
    pub history: Vec<MoveRecord>,
    /// The opponent's reply to the most recent human move
    pub last_ai_move: Option<Move>,
}

impl GameSession {
    pub fn new(id: u64, owner: impl Into<String>, size: usize) -> Result<Self, GameError> {
        let size = check_board_size(size)?;
        Ok(Self {
            id,
            owner: owner.into(),
            created_at: Utc::now(),
            board: Board::new(size),
            current_player: Color::Black,
            status: GameStatus::Active,
            captured_by_human: 0,
            captured_by_ai: 0,
            winner: None,
            end_reason: None,
            consecutive_passes: 0,
            previous_board: None,
            history: Vec::new(),
            last_ai_move: None,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == GameStatus::Active
    }

    pub fn captures_by(&self, color: Color) -> usize {
        if color == HUMAN_COLOR {
            self.captured_by_human
        } else {
            self.captured_by_ai
        }
    }

    pub fn authorize(&self, actor: &str) -> Result<(), GameError> {
        if self.owner == actor {
            Ok(())
        } else {
            Err(GameError::NotAuthorized)
        }
    }

    /// Apply a human move and, if the game goes on, the opponent's reply.
    ///
    /// Either both halves happen or, on error, nothing changes. The opponent
    /// cannot make this fail: its faults turn into a pass.
    pub fn apply_move(
        &mut self,
        actor: &str,
        mv: Move,
        opponent: &mut Opponent,
    ) -> Result<GameSnapshot, GameError> {
        self.authorize(actor)?;
        if !self.is_active() {
            return Err(GameError::GameOver);
        }
        if mv.color() != HUMAN_COLOR {
            return Err(GameError::NotYourTurn);
        }
        validate(self, &mv)?;

        let mut next = self.clone();
        next.last_ai_move = None;
        next.commit(&mv)?;

        if next.is_active() && next.current_player == AI_COLOR {
            // `respond` only hands back moves `validate` accepted against `next`.
            let reply = opponent.respond(&next);
            next.commit(&reply)?;
            next.last_ai_move = Some(reply);
        }
        *self = next;
        Ok(self.snapshot())
    }

    fn commit(&mut self, mv: &Move) -> Result<(), GameError> {
        let delta = capture::apply(self, mv)?;
        debug!(game_id = self.id, %mv, captured = delta.count(), "move applied");
        if delta.finished {
            info!(
                game_id = self.id,
                winner = ?self.winner,
                human = self.captured_by_human,
                ai = self.captured_by_ai,
                "game finished"
            );
        }
        Ok(())
    }

    /// The human gives up; the opponent wins.
    pub fn resign(&mut self, actor: &str) -> Result<GameSnapshot, GameError> {
        self.authorize(actor)?;
        if !self.is_active() {
            return Err(GameError::GameOver);
        }
        finish(self, Outcome::won_by(AI_COLOR), EndReason::Resignation);
        info!(game_id = self.id, "human resigned");
        Ok(self.snapshot())
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            id: self.id,
            board: self.board.rows(),
            board_size: self.board.size(),
            current_player: self.current_player,
            game_status: self.status,
            captured_by_human: self.captured_by_human,
            captured_by_ai: self.captured_by_ai,
            winner: self.winner,
            end_reason: self.end_reason,
            created_at: self.created_at,
            ai_move: self.last_ai_move,
            history: self.history.clone(),
        }
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            id: self.id,
            board_size: self.board.size(),
            game_status: self.status,
            winner: self.winner,
            moves: self.history.len(),
            created_at: self.created_at,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a saved session and check it describes a game this engine could have produced.
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let session: Self =
            serde_json::from_str(json).map_err(|err| GameError::Storage(err.to_string()))?;
        session.check_consistent()?;
        Ok(session)
    }

    fn check_consistent(&self) -> Result<(), GameError> {
        let size = check_board_size(self.board.size())?;
        let finished = self.status == GameStatus::Finished;
        let broken = |reason: &str| Err(GameError::Storage(format!("game {}: {reason}", self.id)));

        if self.winner.is_some() != finished || self.end_reason.is_some() != finished {
            return broken("result does not match status");
        }
        if self.consecutive_passes > PASSES_TO_END
            || (!finished && self.consecutive_passes == PASSES_TO_END)
        {
            return broken("pass count out of range");
        }
        if !finished && self.current_player != HUMAN_COLOR {
            return broken("active game waiting on the opponent");
        }
        if self.previous_board.as_ref().is_some_and(|prev| prev.size() != size) {
            return broken("previous board size differs");
        }
        Ok(())
    }
}

/// Everything a renderer needs to draw the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub id: u64,
    pub board: Vec<Vec<Option<Color>>>,
    pub board_size: usize,
    pub current_player: Color,
    pub game_status: GameStatus,
    pub captured_by_human: usize,
    pub captured_by_ai: usize,
    pub winner: Option<Outcome>,
    pub end_reason: Option<EndReason>,
    pub created_at: DateTime<Utc>,
    pub ai_move: Option<Move>,
    pub history: Vec<MoveRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: u64,
    pub board_size: usize,
    pub game_status: GameStatus,
    pub winner: Option<Outcome>,
    pub moves: usize,
    pub created_at: DateTime<Utc>,
}

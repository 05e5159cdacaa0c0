//! Move selection for the automated side.
//!
//! A [`Strategy`] proposes a move; the [`Opponent`] wrapper enforces the
//! contract around it. Whatever the strategy does (panics, overruns its time
//! budget, proposes an illegal move), `Opponent::respond` returns a move the
//! validator accepts within the budget, falling back to a pass.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::board::{Board, Color, Point};
use crate::config::StrategyKind;
use crate::constants::{
    NEAR_STONES_RADIUS, WEIGHT_CAPTURE, WEIGHT_EDGE, WEIGHT_NEAR_STONES, WEIGHT_SAVE,
    WEIGHT_SELF_ATARI,
};
use crate::error::GameError;
use crate::group::try_group_at;
use crate::rules::{Move, place_and_capture, validate};
use crate::session::GameSession;

/// Read-only view handed to a strategy: the position plus a legality oracle.
pub struct MoveContext<'a> {
    session: &'a GameSession,
    deadline: Instant,
}

impl<'a> MoveContext<'a> {
    pub fn new(session: &'a GameSession, deadline: Instant) -> Self {
        Self { session, deadline }
    }

    pub fn board(&self) -> &Board {
        &self.session.board
    }

    pub fn session(&self) -> &GameSession {
        self.session
    }

    pub fn validate(&self, mv: &Move) -> Result<(), GameError> {
        validate(self.session, mv)
    }

    pub fn is_legal(&self, mv: &Move) -> bool {
        self.validate(mv).is_ok()
    }

    /// True once the strategy has used up its budget and should pass.
    pub fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// A move-selection policy.
pub trait Strategy: Send {
    fn name(&self) -> &'static str;

    /// Propose a move for `color`. Should be legal and should return before
    /// the context expires; the [`Opponent`] passes on its behalf otherwise.
    fn select_move(&mut self, ctx: &MoveContext<'_>, color: Color) -> Move;
}

/// Build the configured strategy. A seed makes its random choices repeatable.
pub fn build_strategy(kind: StrategyKind, seed: Option<u64>) -> Box<dyn Strategy> {
    let rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    match kind {
        StrategyKind::Heuristic => Box::new(HeuristicStrategy::new(rng)),
        StrategyKind::Random => Box::new(RandomStrategy::new(rng)),
        StrategyKind::Pass => Box::new(PassStrategy),
    }
}

/// What a worker hands back: the move and the strategy, or a panic message.
type Proposal = Result<(Move, Box<dyn Strategy>), String>;

/// A strategy bundled with its time budget.
///
/// Each move is computed on a worker thread holding a copy of the session.
/// The caller waits at most `budget`; a worker that has not answered by then
/// is abandoned together with its strategy, and every later request passes.
pub struct Opponent {
    name: &'static str,
    strategy: Option<Box<dyn Strategy>>,
    budget: Duration,
}

impl Opponent {
    pub fn new(strategy: Box<dyn Strategy>, budget: Duration) -> Self {
        Self {
            name: strategy.name(),
            strategy: Some(strategy),
            budget,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Produce a legal move for the side to play in `session`.
    pub fn respond(&mut self, session: &GameSession) -> Move {
        let color = session.current_player;
        match self.propose(session, color) {
            Ok(mv) => mv,
            Err(fault) => {
                warn!(game_id = session.id, strategy = self.name, %fault, "forcing pass");
                Move::Pass { color }
            }
        }
    }

    fn propose(&mut self, session: &GameSession, color: Color) -> Result<Move, GameError> {
        let mut strategy = self
            .strategy
            .take()
            .ok_or_else(|| GameError::StrategyFault("strategy lost to an earlier fault".into()))?;

        let start = Instant::now();
        let deadline = start + self.budget;
        let position = session.clone();
        let (tx, rx) = mpsc::channel::<Proposal>();

        thread::Builder::new()
            .name(format!("opponent-{}", session.id))
            .spawn(move || {
                let ctx = MoveContext::new(&position, deadline);
                let picked =
                    panic::catch_unwind(AssertUnwindSafe(|| strategy.select_move(&ctx, color)));
                let proposal = match picked {
                    Ok(mv) => Ok((mv, strategy)),
                    Err(payload) => Err(panic_message(payload.as_ref())),
                };
                // The receiver is gone once the budget has run out.
                let _ = tx.send(proposal);
            })
            .map_err(|err| GameError::StrategyFault(format!("cannot start worker: {err}")))?;

        let mv = match rx.recv_timeout(self.budget) {
            Ok(Ok((mv, strategy))) => {
                self.strategy = Some(strategy);
                mv
            }
            Ok(Err(message)) => {
                return Err(GameError::StrategyFault(format!("strategy panicked: {message}")));
            }
            Err(RecvTimeoutError::Timeout) => {
                return Err(GameError::StrategyFault(format!(
                    "no move within {:?}",
                    self.budget
                )));
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(GameError::StrategyFault("worker exited without a move".into()));
            }
        };

        validate(session, &mv)
            .map_err(|err| GameError::StrategyFault(format!("proposed {mv}: {err}")))?;
        debug!(game_id = session.id, strategy = self.name, %mv, elapsed = ?start.elapsed(), "opponent move");
        Ok(mv)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Always passes.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassStrategy;

impl Strategy for PassStrategy {
    fn name(&self) -> &'static str {
        "pass"
    }

    fn select_move(&mut self, _ctx: &MoveContext<'_>, color: Color) -> Move {
        Move::Pass { color }
    }
}

/// Uniformly random legal move that does not fill one of its own eyes.
pub struct RandomStrategy {
    rng: fastrand::Rng,
}

impl RandomStrategy {
    pub fn new(rng: fastrand::Rng) -> Self {
        Self { rng }
    }
}

impl Strategy for RandomStrategy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn select_move(&mut self, ctx: &MoveContext<'_>, color: Color) -> Move {
        let mut candidates: Vec<Point> = ctx
            .board()
            .empty_points()
            .into_iter()
            .filter(|&pt| !is_own_eye(ctx.board(), pt, color))
            .collect();
        self.rng.shuffle(&mut candidates);

        for (row, col) in candidates {
            if ctx.expired() {
                break;
            }
            let mv = Move::Place { row, col, color };
            if ctx.is_legal(&mv) {
                return mv;
            }
        }
        Move::Pass { color }
    }
}

/// One-ply greedy player: captures first, then rescues groups in atari, then
/// plays near existing stones, avoiding self-atari and the first line.
///
/// Passes when nothing is legal, or when the opponent has just passed and
/// this side is not behind on captures with no capture left to make.
pub struct HeuristicStrategy {
    rng: fastrand::Rng,
}

impl HeuristicStrategy {
    pub fn new(rng: fastrand::Rng) -> Self {
        Self { rng }
    }

    /// Urgency of placing `color` at `pt`; `None` if the move is pointless.
    fn score(board: &Board, pt: Point, color: Color) -> Option<i32> {
        if is_own_eye(board, pt, color) {
            return None;
        }
        let (row, col) = pt;
        let mut scratch = board.clone();
        let removed = place_and_capture(&mut scratch, pt, color).ok()?;
        let own = try_group_at(&scratch, row, col)?;

        let mut score = removed.len() as i32 * WEIGHT_CAPTURE;

        let rescues = board
            .neighbors(row, col)
            .filter(|&(r, c)| board.get(r, c) == Some(color))
            .filter_map(|(r, c)| try_group_at(board, r, c))
            .any(|g| g.in_atari());
        if rescues && own.liberties.len() > 1 {
            score += WEIGHT_SAVE;
        }
        if removed.is_empty() && own.in_atari() {
            score += WEIGHT_SELF_ATARI;
        }
        if near_stones(board, pt) {
            score += WEIGHT_NEAR_STONES;
        }
        let last = board.size() - 1;
        if row == 0 || col == 0 || row == last || col == last {
            score += WEIGHT_EDGE;
        }
        Some(score)
    }
}

impl Strategy for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn select_move(&mut self, ctx: &MoveContext<'_>, color: Color) -> Move {
        let pass = Move::Pass { color };
        let mut best: Vec<Point> = Vec::new();
        let mut best_score = i32::MIN;

        for (row, col) in ctx.board().empty_points() {
            if ctx.expired() {
                return pass;
            }
            let Some(score) = Self::score(ctx.board(), (row, col), color) else {
                continue;
            };
            if !ctx.is_legal(&Move::Place { row, col, color }) {
                continue;
            }
            if score > best_score {
                best_score = score;
                best.clear();
            }
            if score == best_score {
                best.push((row, col));
            }
        }

        if best.is_empty() {
            return pass;
        }

        let session = ctx.session();
        let opponent_passed = matches!(
            session.history.last(),
            Some(record) if matches!(record.mv, Move::Pass { .. })
        );
        let not_behind = session.captures_by(color) >= session.captures_by(color.opponent());
        if opponent_passed && not_behind && best_score < WEIGHT_CAPTURE {
            return pass;
        }

        let (row, col) = best[self.rng.usize(..best.len())];
        Move::Place { row, col, color }
    }
}

/// Every orthogonal neighbor is a stone of `color`.
fn is_own_eye(board: &Board, pt: Point, color: Color) -> bool {
    board
        .neighbors(pt.0, pt.1)
        .all(|(r, c)| board.get(r, c) == Some(color))
}

fn near_stones(board: &Board, (row, col): Point) -> bool {
    let size = board.size();
    let span = |x: usize| x.saturating_sub(NEAR_STONES_RADIUS)..(x + NEAR_STONES_RADIUS + 1).min(size);
    span(row).any(|r| span(col).any(|c| (r, c) != (row, col) && board.get(r, c).is_some()))
}

//! Integration tests for baduk-engine
//!
//! Whole games driven through `GameSession::apply_move`, with a scripted
//! opponent so positions are reproducible.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use baduk_engine::board::{Color, Point};
use baduk_engine::config::StrategyKind;
use baduk_engine::error::GameError;
use baduk_engine::rules::{Move, legal_placements};
use baduk_engine::session::{EndReason, GameSession, GameStatus, Outcome};
use baduk_engine::strategy::{MoveContext, Opponent, Strategy, build_strategy};

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

const OWNER: &str = "alice";

/// Opponent that plays a fixed list of points, then passes.
/// Illegal entries are consumed and turned into passes by `Opponent`.
struct Scripted {
    moves: VecDeque<Point>,
}

impl Strategy for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn select_move(&mut self, _ctx: &MoveContext<'_>, color: Color) -> Move {
        match self.moves.pop_front() {
            Some((row, col)) => Move::Place { row, col, color },
            None => Move::Pass { color },
        }
    }
}

fn scripted(white: &[Point]) -> Opponent {
    let strategy = Scripted {
        moves: white.iter().copied().collect(),
    };
    Opponent::new(Box::new(strategy), Duration::from_secs(5))
}

fn black(row: usize, col: usize) -> Move {
    Move::Place {
        row,
        col,
        color: Color::Black,
    }
}

fn black_pass() -> Move {
    Move::Pass {
        color: Color::Black,
    }
}

/// Play `moves` for black against `opponent`; panics on any rejection.
fn setpos(session: &mut GameSession, opponent: &mut Opponent, moves: &[Point]) {
    for &(row, col) in moves {
        if let Err(err) = session.apply_move(OWNER, black(row, col), opponent) {
            panic!("Illegal move ({row}, {col}) in setpos: {err}");
        }
    }
}

fn new_game() -> GameSession {
    GameSession::new(1, OWNER, 9).unwrap()
}

// =============================================================================
// Basic play
// =============================================================================

#[test]
fn test_center_move_gets_a_reply() {
    let mut session = new_game();
    let mut opponent = Opponent::new(
        build_strategy(StrategyKind::Heuristic, Some(42)),
        Duration::from_secs(5),
    );

    let snap = session.apply_move(OWNER, black(4, 4), &mut opponent).unwrap();

    assert_eq!(snap.board[4][4], Some(Color::Black));
    assert_eq!(snap.current_player, Color::Black, "turn returns to the human");
    assert_eq!(snap.game_status, GameStatus::Active);
    match snap.ai_move {
        Some(Move::Place { row, col, color }) => {
            assert_eq!(color, Color::White);
            assert_eq!(snap.board[row][col], Some(Color::White));
        }
        Some(Move::Pass { color }) => assert_eq!(color, Color::White),
        None => panic!("opponent should have replied"),
    }
}

#[test]
fn test_occupied_leaves_state_unchanged() {
    let mut session = new_game();
    let mut opponent = scripted(&[(0, 0)]);
    setpos(&mut session, &mut opponent, &[(4, 4)]);

    let before = session.clone();
    for (row, col) in [(4, 4), (0, 0)] {
        assert_eq!(
            session.apply_move(OWNER, black(row, col), &mut opponent),
            Err(GameError::Occupied { row, col })
        );
    }
    assert_eq!(session, before);
}

#[test]
fn test_out_of_bounds() {
    let mut session = new_game();
    let mut opponent = scripted(&[]);
    assert_eq!(
        session.apply_move(OWNER, black(9, 0), &mut opponent),
        Err(GameError::OutOfBounds { row: 9, col: 0 })
    );
}

// =============================================================================
// Capture tests
// =============================================================================

#[test]
fn test_capture_surrounded_stone() {
    let mut session = new_game();
    let mut opponent = scripted(&[(2, 2), (8, 8), (8, 6)]);
    setpos(&mut session, &mut opponent, &[(1, 2), (3, 2), (2, 1)]);
    assert_eq!(session.board.get(2, 2), Some(Color::White));
    assert_eq!(session.captured_by_human, 0);

    let snap = session.apply_move(OWNER, black(2, 3), &mut opponent).unwrap();

    assert_eq!(snap.board[2][2], None, "white stone should be removed");
    assert_eq!(snap.captured_by_human, 1);
    assert_eq!(snap.captured_by_ai, 0);
    let record = &session.history[session.history.len() - 2];
    assert_eq!(record.mv, black(2, 3));
    assert_eq!(record.captured, 1);
}

#[test]
fn test_opponent_capture_counts_for_ai() {
    let mut session = new_game();
    // Black corner stone at (0,0); white takes both liberties.
    let mut opponent = scripted(&[(0, 1), (1, 0)]);
    setpos(&mut session, &mut opponent, &[(0, 0), (5, 5)]);

    assert_eq!(session.board.get(0, 0), None);
    assert_eq!(session.captured_by_ai, 1);
    assert_eq!(session.captured_by_human, 0);
}

#[test]
fn test_capture_group() {
    let mut session = new_game();
    // White pair (4,4)-(4,5), black surrounds and finishes at (4,6).
    let mut opponent = scripted(&[(4, 4), (4, 5), (8, 8), (8, 6), (8, 4)]);
    setpos(&mut session, &mut opponent, &[(3, 4), (3, 5), (5, 4), (5, 5), (4, 3)]);

    let snap = session.apply_move(OWNER, black(4, 6), &mut opponent).unwrap();
    assert_eq!(snap.board[4][4], None);
    assert_eq!(snap.board[4][5], None);
    assert_eq!(snap.captured_by_human, 2);
}

// =============================================================================
// Suicide tests
// =============================================================================

#[test]
fn test_suicide_single_stone() {
    let mut session = new_game();
    let mut opponent = scripted(&[(0, 1), (1, 0)]);
    setpos(&mut session, &mut opponent, &[(5, 5), (6, 6)]);

    let before = session.clone();
    assert_eq!(
        session.apply_move(OWNER, black(0, 0), &mut opponent),
        Err(GameError::Suicide { row: 0, col: 0 })
    );
    assert_eq!(session, before);
}

#[test]
fn test_capture_is_not_suicide() {
    let mut session = new_game();
    // Black (1,0) has no liberty of its own, but takes white (0,0)'s last one.
    //   W B .
    //   . W .
    //   W . .
    let mut opponent = scripted(&[(0, 0), (1, 1), (2, 0)]);
    setpos(&mut session, &mut opponent, &[(0, 1), (8, 8), (8, 7)]);
    assert_eq!(session.board.get(2, 0), Some(Color::White));

    let snap = session.apply_move(OWNER, black(1, 0), &mut opponent).unwrap();
    assert_eq!(snap.board[0][0], None);
    assert_eq!(snap.board[1][0], Some(Color::Black));
    assert_eq!(snap.captured_by_human, 1);
}

// =============================================================================
// Ko tests
// =============================================================================

#[test]
fn test_simple_ko() {
    // Build the classic ko shape:
    //   . B W .
    //   B W . W
    //   . B W .
    let mut session = new_game();
    let mut opponent = scripted(&[
        (0, 2),
        (1, 3),
        (2, 2),
        (1, 1),
        // Retake right after black captures: forbidden, becomes a pass.
        (1, 1),
        // After black plays elsewhere the retake is legal.
        (1, 1),
    ]);
    setpos(&mut session, &mut opponent, &[(0, 1), (1, 0), (2, 1), (8, 8)]);

    // Black captures at (1,2).
    let snap = session.apply_move(OWNER, black(1, 2), &mut opponent).unwrap();
    assert_eq!(snap.captured_by_human, 1);
    assert_eq!(snap.board[1][1], None);
    assert_eq!(
        snap.ai_move,
        Some(Move::Pass {
            color: Color::White
        }),
        "immediate retake must be refused"
    );

    // Black tenuki; the position has changed, so white may retake now.
    let snap = session.apply_move(OWNER, black(8, 0), &mut opponent).unwrap();
    assert_eq!(
        snap.ai_move,
        Some(Move::Place {
            row: 1,
            col: 1,
            color: Color::White
        })
    );
    assert_eq!(snap.board[1][2], None);
    assert_eq!(snap.captured_by_ai, 1);

    // And black may not immediately take back.
    let before = session.clone();
    assert_eq!(
        session.apply_move(OWNER, black(1, 2), &mut opponent),
        Err(GameError::KoViolation { row: 1, col: 2 })
    );
    assert_eq!(session, before);
}

// =============================================================================
// Opponent budget
// =============================================================================

/// Takes far longer than any budget used here.
struct Stalling;

impl Strategy for Stalling {
    fn name(&self) -> &'static str {
        "stalling"
    }

    fn select_move(&mut self, _ctx: &MoveContext<'_>, color: Color) -> Move {
        std::thread::sleep(Duration::from_secs(3));
        Move::Pass { color }
    }
}

#[test]
fn test_slow_opponent_does_not_hold_the_game() {
    let mut session = new_game();
    let mut opponent = Opponent::new(Box::new(Stalling), Duration::from_millis(10));

    let start = Instant::now();
    let snap = session.apply_move(OWNER, black(4, 4), &mut opponent).unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed < Duration::from_secs(1), "reply took {elapsed:?}");
    assert_eq!(snap.board[4][4], Some(Color::Black));
    assert_eq!(
        snap.ai_move,
        Some(Move::Pass {
            color: Color::White
        })
    );
    assert_eq!(snap.current_player, Color::Black);
}

// =============================================================================
// Termination tests
// =============================================================================

#[test]
fn test_two_passes_finish_and_freeze() {
    let mut session = new_game();
    let mut opponent = scripted(&[(0, 1), (1, 0)]);
    setpos(&mut session, &mut opponent, &[(0, 0), (5, 5)]);
    // Scripted opponent is out of moves: passes after this.
    session.apply_move(OWNER, black(5, 6), &mut opponent).unwrap();
    assert_eq!(session.consecutive_passes, 1);

    let snap = session.apply_move(OWNER, black_pass(), &mut opponent).unwrap();
    assert_eq!(snap.game_status, GameStatus::Finished);
    assert_eq!(snap.winner, Some(Outcome::White), "white captured more");
    assert_eq!(snap.end_reason, Some(EndReason::Passes));

    let frozen = session.clone();
    assert_eq!(
        session.apply_move(OWNER, black(7, 7), &mut opponent),
        Err(GameError::GameOver)
    );
    assert_eq!(
        session.apply_move(OWNER, black_pass(), &mut opponent),
        Err(GameError::GameOver)
    );
    assert_eq!(session.resign(OWNER), Err(GameError::GameOver));
    assert_eq!(session, frozen);
}

#[test]
fn test_human_pass_then_opponent_pass_ends_game() {
    let mut session = new_game();
    let mut opponent = scripted(&[]);
    let snap = session.apply_move(OWNER, black_pass(), &mut opponent).unwrap();
    assert_eq!(snap.game_status, GameStatus::Finished);
    assert_eq!(snap.winner, Some(Outcome::Draw));
    assert_eq!(session.history.len(), 2);
}

#[test]
fn test_human_lead_wins_on_passes() {
    let mut session = new_game();
    let mut opponent = scripted(&[(2, 2), (8, 8), (8, 6)]);
    setpos(&mut session, &mut opponent, &[(1, 2), (3, 2), (2, 1), (2, 3)]);
    // Opponent has passed once; black pass ends it.
    let snap = session.apply_move(OWNER, black_pass(), &mut opponent).unwrap();
    assert_eq!(snap.winner, Some(Outcome::Black));
}

#[test]
fn test_heuristic_game_terminates() {
    let mut session = new_game();
    let mut opponent = Opponent::new(
        build_strategy(StrategyKind::Heuristic, Some(7)),
        Duration::from_secs(5),
    );
    for turn in 0..400 {
        if !session.is_active() {
            break;
        }
        let mv = if turn < 20 {
            legal_placements(&session, Color::Black)
                .first()
                .map_or_else(black_pass, |&(row, col)| black(row, col))
        } else {
            black_pass()
        };
        let human = session.captured_by_human;
        let ai = session.captured_by_ai;
        session.apply_move(OWNER, mv, &mut opponent).unwrap();
        assert!(session.captured_by_human >= human);
        assert!(session.captured_by_ai >= ai);
    }
    assert_eq!(session.status, GameStatus::Finished);
    assert!(session.winner.is_some());
}

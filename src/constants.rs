//! Constants for board dimensions, opponent budgets, and heuristic weights.
//!
//! Board sizes are chosen per game at runtime; these values are the defaults
//! and limits the engine falls back to when a caller does not override them.

use std::time::Duration;

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size used when a game is created without an explicit size.
pub const DEFAULT_BOARD_SIZE: usize = 9;

/// Board sizes a game may be created with.
pub const ALLOWED_BOARD_SIZES: [usize; 3] = [9, 13, 19];

/// Number of consecutive passes that ends a game.
pub const PASSES_TO_END: u8 = 2;

// =============================================================================
// Opponent Parameters
// =============================================================================

/// Default wall-clock budget for the automated opponent to pick one move.
pub const DEFAULT_STRATEGY_BUDGET: Duration = Duration::from_millis(2000);

/// Chebyshev radius inside which a point counts as "near" existing stones.
pub const NEAR_STONES_RADIUS: usize = 2;

// =============================================================================
// Heuristic Weights (higher = more urgent)
// =============================================================================

/// Bonus per opposing stone removed by a candidate move.
pub const WEIGHT_CAPTURE: i32 = 100;

/// Bonus for a move that lifts a friendly group out of atari.
pub const WEIGHT_SAVE: i32 = 60;

/// Penalty for a move that leaves the placed group in atari.
pub const WEIGHT_SELF_ATARI: i32 = -40;

/// Bonus for a move within [`NEAR_STONES_RADIUS`] of any stone.
pub const WEIGHT_NEAR_STONES: i32 = 10;

/// Penalty for first-line moves.
pub const WEIGHT_EDGE: i32 = -5;

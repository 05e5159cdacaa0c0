//! Baduk-Engine: Go games between a human and an automated opponent.
//!
//! The engine owns board state, enforces placement, capture, suicide and ko
//! rules, alternates turns between the human (black) and the opponent
//! (white), and decides when a game is over and who won.
//!
//! ## Modules
//!
//! - [`constants`] - Board sizes, opponent budget, heuristic weights
//! - [`error`] - Error taxonomy
//! - [`board`] - Stone storage and adjacency
//! - [`group`] - Connected groups and liberties
//! - [`rules`] - Move legality (occupancy, suicide, ko)
//! - [`capture`] - Applying moves, removing captured stones
//! - [`session`] - One game's state machine
//! - [`strategy`] - Pluggable opponent policies
//! - [`store`] - Keyed, per-game serialized session store
//! - [`config`] - Engine configuration
//! - [`protocol`] - Text command server over the store
//!
//! ## Example
//!
//! ```
//! use baduk_engine::config::{EngineConfig, StrategyKind};
//! use baduk_engine::session::GameStatus;
//! use baduk_engine::store::SessionStore;
//!
//! let store = SessionStore::new(EngineConfig::default().with_strategy(StrategyKind::Pass));
//! let game = store.create("alice", None).unwrap();
//!
//! // Black plays the center; the opponent replies before this returns.
//! let snap = store.place(game.id, "alice", 4, 4).unwrap();
//! assert!(snap.ai_move.is_some());
//!
//! // Opponent passed, so a human pass ends the game.
//! let snap = store.pass(game.id, "alice").unwrap();
//! assert_eq!(snap.game_status, GameStatus::Finished);
//! ```

pub mod board;
pub mod capture;
pub mod config;
pub mod constants;
pub mod error;
pub mod group;
pub mod protocol;
pub mod rules;
pub mod session;
pub mod store;
pub mod strategy;

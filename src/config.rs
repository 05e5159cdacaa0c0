//! Engine configuration.
//!
//! Defaults come from [`crate::constants`]; the binary overrides them from
//! command-line flags or `BADUK_*` environment variables.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;

use crate::constants::{ALLOWED_BOARD_SIZES, DEFAULT_BOARD_SIZE, DEFAULT_STRATEGY_BUDGET};
use crate::error::GameError;

/// Which move-selection policy drives the automated side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StrategyKind {
    /// Greedy one-ply heuristics (capture, rescue, play near stones)
    #[default]
    Heuristic,
    /// Random legal moves
    Random,
    /// Always pass
    Pass,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Heuristic => write!(f, "heuristic"),
            StrategyKind::Random => write!(f, "random"),
            StrategyKind::Pass => write!(f, "pass"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <StrategyKind as ValueEnum>::from_str(s, true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Size used by `create` when none is given
    pub default_board_size: usize,
    pub strategy: StrategyKind,
    /// Wall-clock limit for one opponent move
    pub strategy_budget: Duration,
    /// Seed for the opponent's random choices; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_board_size: DEFAULT_BOARD_SIZE,
            strategy: StrategyKind::default(),
            strategy_budget: DEFAULT_STRATEGY_BUDGET,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.strategy_budget = budget;
        self
    }

    /// Reject a configuration whose default board size could never create a game.
    pub fn validated(self) -> Result<Self, GameError> {
        check_board_size(self.default_board_size)?;
        Ok(self)
    }
}

pub fn check_board_size(size: usize) -> Result<usize, GameError> {
    if ALLOWED_BOARD_SIZES.contains(&size) {
        Ok(size)
    } else {
        Err(GameError::InvalidBoardSize(size))
    }
}

//! Keyed session store with per-game serialization.
//!
//! The map itself sits behind an `RwLock` that is only held long enough to
//! look up or insert an entry. Each game has its own `Mutex`; a request that
//! finds its game locked fails fast with `SessionBusy` instead of waiting, so
//! two moves can never interleave on one board while different games proceed
//! in parallel.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, TryLockError};

use tracing::info;

use crate::config::{EngineConfig, check_board_size};
use crate::error::GameError;
use crate::rules::Move;
use crate::session::{GameSession, GameSnapshot, GameSummary, HUMAN_COLOR};
use crate::strategy::{Opponent, build_strategy};

type Slot = Arc<Mutex<GameSession>>;

pub struct SessionStore {
    config: EngineConfig,
    sessions: RwLock<BTreeMap<u64, Slot>>,
    next_id: AtomicU64,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl SessionStore {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a new game owned by `owner`. `None` uses the configured default size.
    pub fn create(&self, owner: &str, size: Option<usize>) -> Result<GameSnapshot, GameError> {
        let size = check_board_size(size.unwrap_or(self.config.default_board_size))?;
        // Allocate under the map lock; `import` claims ids under the same lock.
        let mut map = self.write_map();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let session = GameSession::new(id, owner, size)?;
        let snapshot = session.snapshot();
        map.insert(id, Arc::new(Mutex::new(session)));
        drop(map);
        info!(game_id = id, owner, size, "game created");
        Ok(snapshot)
    }

    /// Summaries of every game `owner` created, oldest first.
    pub fn list(&self, owner: &str) -> Vec<GameSummary> {
        let slots: Vec<Slot> = self.read_map().values().cloned().collect();
        slots
            .iter()
            .map(lock_blocking)
            .filter(|session| session.owner == owner)
            .map(|session| session.summary())
            .collect()
    }

    pub fn get(&self, id: u64, owner: &str) -> Result<GameSnapshot, GameError> {
        self.with_session(id, owner, |session| Ok(session.snapshot()))
    }

    pub fn place(
        &self,
        id: u64,
        owner: &str,
        row: usize,
        col: usize,
    ) -> Result<GameSnapshot, GameError> {
        let mv = Move::Place {
            row,
            col,
            color: HUMAN_COLOR,
        };
        self.play(id, owner, mv)
    }

    pub fn pass(&self, id: u64, owner: &str) -> Result<GameSnapshot, GameError> {
        self.play(id, owner, Move::Pass { color: HUMAN_COLOR })
    }

    pub fn resign(&self, id: u64, owner: &str) -> Result<GameSnapshot, GameError> {
        self.with_session(id, owner, |session| session.resign(owner))
    }

    /// Drop a game. Deletion is the caller's policy; the engine never removes games itself.
    pub fn remove(&self, id: u64, owner: &str) -> Result<(), GameError> {
        self.with_session(id, owner, |_| Ok(()))?;
        self.write_map().remove(&id);
        Ok(())
    }

    /// Serialized form of a game, for an external storage layer.
    pub fn export(&self, id: u64, owner: &str) -> Result<String, GameError> {
        self.with_session(id, owner, |session| {
            session
                .to_json()
                .map_err(|err| GameError::Storage(err.to_string()))
        })
    }

    /// Load a previously exported game under its original id.
    ///
    /// The id must be free; an existing game is never replaced.
    pub fn import(&self, json: &str) -> Result<u64, GameError> {
        let session = GameSession::from_json(json)?;
        let id = session.id;
        let next = id
            .checked_add(1)
            .ok_or_else(|| GameError::Storage(format!("game id {id} out of range")))?;

        let mut map = self.write_map();
        if map.contains_key(&id) {
            return Err(GameError::Conflict(id));
        }
        self.next_id.fetch_max(next, Ordering::Relaxed);
        info!(game_id = id, owner = %session.owner, "game imported");
        map.insert(id, Arc::new(Mutex::new(session)));
        Ok(id)
    }

    fn play(&self, id: u64, owner: &str, mv: Move) -> Result<GameSnapshot, GameError> {
        let seed = self.config.seed;
        let strategy = self.config.strategy;
        let budget = self.config.strategy_budget;
        self.with_session(id, owner, |session| {
            // Mix the move number in so a seeded opponent does not repeat itself.
            let seed = seed.map(|s| s ^ (id << 32) ^ session.history.len() as u64);
            let mut opponent = Opponent::new(build_strategy(strategy, seed), budget);
            session.apply_move(owner, mv, &mut opponent)
        })
    }

    /// Run `f` with exclusive access to game `id` after checking ownership.
    fn with_session<T>(
        &self,
        id: u64,
        owner: &str,
        f: impl FnOnce(&mut GameSession) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let slot = self
            .read_map()
            .get(&id)
            .cloned()
            .ok_or(GameError::NotFound(id))?;
        let mut session = match slot.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(GameError::SessionBusy(id)),
        };
        session.authorize(owner)?;
        f(&mut session)
    }

    fn read_map(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<u64, Slot>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_map(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<u64, Slot>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock_blocking(slot: &Slot) -> MutexGuard<'_, GameSession> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

//! Store-level tests: the external operations and concurrent access.

use std::sync::{Arc, Barrier};
use std::thread;

use baduk_engine::board::Color;
use baduk_engine::config::{EngineConfig, StrategyKind};
use baduk_engine::error::GameError;
use baduk_engine::session::{GameStatus, Outcome};
use baduk_engine::store::SessionStore;

fn store(strategy: StrategyKind) -> SessionStore {
    SessionStore::new(EngineConfig::default().with_strategy(strategy).with_seed(3))
}

#[test]
fn test_full_game_through_store() {
    let store = store(StrategyKind::Heuristic);
    let game = store.create("alice", Some(9)).unwrap();
    assert_eq!(game.game_status, GameStatus::Active);
    assert_eq!(game.current_player, Color::Black);
    assert!(game.board.iter().flatten().all(Option::is_none));

    let snap = store.place(game.id, "alice", 4, 4).unwrap();
    assert_eq!(snap.board[4][4], Some(Color::Black));
    assert_eq!(snap.current_player, Color::Black);
    assert!(snap.ai_move.is_some());

    let shown = store.get(game.id, "alice").unwrap();
    assert_eq!(shown, snap);

    // Keep passing; the heuristic opponent eventually passes back.
    let mut last = shown;
    for _ in 0..200 {
        if last.game_status == GameStatus::Finished {
            break;
        }
        last = store.pass(game.id, "alice").unwrap();
    }
    assert_eq!(last.game_status, GameStatus::Finished);
    assert!(last.winner.is_some());
    assert_eq!(store.pass(game.id, "alice"), Err(GameError::GameOver));
}

#[test]
fn test_invalid_size_rejected() {
    let store = store(StrategyKind::Pass);
    assert_eq!(
        store.create("alice", Some(4)),
        Err(GameError::InvalidBoardSize(4))
    );
    assert!(store.list("alice").is_empty());
}

#[test]
fn test_resign_through_store() {
    let store = store(StrategyKind::Pass);
    let id = store.create("alice", None).unwrap().id;
    let snap = store.resign(id, "alice").unwrap();
    assert_eq!(snap.game_status, GameStatus::Finished);
    assert_eq!(snap.winner, Some(Outcome::White));
    assert_eq!(store.resign(id, "alice"), Err(GameError::GameOver));
}

#[test]
fn test_list_reports_progress() {
    let store = store(StrategyKind::Pass);
    let id = store.create("alice", None).unwrap().id;
    store.place(id, "alice", 2, 2).unwrap();
    let games = store.list("alice");
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].id, id);
    // Black's stone plus the opponent's pass.
    assert_eq!(games[0].moves, 2);
    assert!(store.list("bob").is_empty());
}

#[test]
fn test_distinct_games_play_in_parallel() {
    let store = Arc::new(store(StrategyKind::Random));
    let owners = ["a", "b", "c", "d"];
    let ids: Vec<u64> = owners
        .iter()
        .map(|owner| store.create(owner, None).unwrap().id)
        .collect();

    let handles: Vec<_> = owners
        .iter()
        .zip(ids.iter().copied())
        .map(|(&owner, id)| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for (row, col) in [(0, 0), (8, 8), (0, 8), (8, 0), (4, 4)] {
                    match store.place(id, owner, row, col) {
                        Ok(_)
                        | Err(GameError::Occupied { .. })
                        | Err(GameError::Suicide { .. })
                        | Err(GameError::KoViolation { .. }) => {}
                        Err(err) => panic!("{owner}: unexpected {err}"),
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for (&owner, id) in owners.iter().zip(ids) {
        let snap = store.get(id, owner).unwrap();
        // The first move is always on an empty board.
        assert!(snap.history.len() >= 2);
        assert_eq!(snap.history.len() % 2, 0);
        assert_eq!(snap.current_player, Color::Black);
        assert_eq!(store.list(owner).len(), 1);
    }
}

#[test]
fn test_same_game_never_interleaves() {
    let store = Arc::new(store(StrategyKind::Pass));
    let id = store.create("alice", None).unwrap().id;
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.place(id, "alice", i, i)
            })
        })
        .collect();

    let mut applied = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(_) => applied += 1,
            Err(GameError::SessionBusy(busy)) => assert_eq!(busy, id),
            Err(err) => panic!("unexpected {err}"),
        }
    }

    // Every accepted request is one black move plus one opponent reply.
    let snap = store.get(id, "alice").unwrap();
    assert!(applied >= 1);
    assert_eq!(snap.history.len(), applied * 2);
    let black = snap.board.iter().flatten().filter(|c| **c == Some(Color::Black)).count();
    assert_eq!(black, applied);
    assert_eq!(snap.current_player, Color::Black);
}

//! Integration tests for the Ataxx tournament runner
//!
//! Tests the full stack: rule engine, strategies, registry, game loop,
//! tournament bookkeeping and persistence

use std::path::PathBuf;
use std::time::{Duration, Instant};

use ataxx_core::{Board, FirstMoveAgent, Player};
use ataxx_mcts::{MctsConfig, MctsPlayer};
use ataxx_tournament::{
    Entrant, LoadedMap, ResultStore, RunControl, Scheduler, ThreadScheduler, Tournament,
    TournamentConfig, CSV_HEADER,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// Scheduler that never sleeps
struct NoWait;

impl Scheduler for NoWait {
    fn suspend(&mut self, _duration: Duration, _control: &RunControl) {}
}

/// The side to move fills the only gap and captures everything
fn first_mover_wins_map() -> LoadedMap {
    LoadedMap::new(
        "Tiny",
        Board::parse("B.W####\n#######\n#######\n#######\n#######\n#######\n#######").unwrap(),
    )
}

/// A 4x5 open area walled in by blocked cells
const SMALL_MAP: &str = "B...W##\n.....##\n.....##\nW...B##\n#######\n#######\n#######\n";

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ataxx-it-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn first_move_entrants() -> [Entrant; 2] {
    [
        Entrant::new("Alpha", Box::new(FirstMoveAgent)),
        Entrant::new("Beta", Box::new(FirstMoveAgent)),
    ]
}

// ============================================================================
// END TO END
// ============================================================================

#[test]
fn test_deterministic_stub_splits_the_match() {
    let maps = [first_mover_wins_map(), LoadedMap::default_layout()];
    for (map, opening) in maps.iter().flat_map(|m| [(m, Player::Black), (m, Player::White)]) {
        let config = TournamentConfig::new(1).with_first_player(opening);
        let mut tournament =
            Tournament::with_entrants(config, map.clone(), first_move_entrants()).unwrap();

        let report = tournament.run(&mut NoWait);
        assert!(report.completed, "{}", map.id);
        assert!(report.issues.is_empty());
        // The stub plays decisive games on both layouts
        for record in &report.games {
            assert!(record.outcome.result.winner().is_some(), "{}", map.id);
            assert_eq!(record.outcome.forced_passes, 0);
        }

        let wins: u32 = report.results.values().map(|r| r.wins).sum();
        let losses: u32 = report.results.values().map(|r| r.losses).sum();
        let draws: u32 = report.results.values().map(|r| r.draws).sum();
        assert_eq!((wins, losses, draws), (2, 2, 0));
        for record in report.results.values() {
            assert_eq!((record.wins, record.losses, record.games_played), (1, 1, 2));
        }
    }
}

#[test]
fn test_registry_agents_play_full_tournament() {
    let maps = scratch_dir("registry");
    std::fs::write(maps.join("small.txt"), SMALL_MAP).unwrap();

    let config = TournamentConfig::new(1)
        .with_depth(1)
        .with_iterations(10)
        .with_threshold(8)
        .with_map(&maps, Some("small.txt".into()));
    let mut tournament = Tournament::new(config, "AB+MCTS_Domain_10", "Minimax").unwrap();
    assert_eq!(tournament.map().id, "Map_0_small");

    let report = tournament.run(&mut NoWait);
    assert!(report.completed);
    assert!(report.issues.is_empty());
    assert_eq!(report.games.len(), 2);
    for record in report.results.values() {
        assert_eq!(record.games_played, 2);
        assert_eq!(record.wins + record.losses + record.draws, 2);
    }
    // Scores never outlive a game
    assert!(tournament.scores().read_all().is_empty());
}

#[test]
fn test_custom_sampling_entrants() {
    let config = TournamentConfig::new(1).with_first_player(Player::Black);
    let entrants = [
        Entrant::new("Random", Box::new(MctsPlayer::with_seed(MctsConfig::baseline(8), 1))),
        Entrant::new("Greedy", Box::new(MctsPlayer::with_seed(MctsConfig::domain(8), 2))),
    ];
    let map = LoadedMap::new("Small", Board::parse(SMALL_MAP).unwrap());
    let mut tournament = Tournament::with_entrants(config, map, entrants).unwrap();

    let report = tournament.run(&mut NoWait);
    assert!(report.completed);
    assert_eq!(report.total_recorded(), 4);
}

// ============================================================================
// CANCELLATION
// ============================================================================

#[test]
fn test_stop_from_another_thread() {
    let config = TournamentConfig::new(50).with_delays(Duration::from_millis(20), Duration::ZERO);
    let mut tournament = Tournament::with_entrants(
        config,
        LoadedMap::default_layout(),
        first_move_entrants(),
    )
    .unwrap();

    let control = tournament.control();
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(150));
        control.stop();
    });

    let start = Instant::now();
    let report = tournament.run(&mut ThreadScheduler);
    stopper.join().unwrap();

    assert!(!report.completed);
    assert!(report.total_recorded() < 200);
    assert!(start.elapsed() < Duration::from_secs(5));
    for record in report.results.values() {
        assert_eq!(record.wins + record.losses + record.draws, record.games_played);
    }
}

#[test]
fn test_pause_then_resume() {
    let config = TournamentConfig::new(1).with_first_player(Player::Black);
    let mut tournament =
        Tournament::with_entrants(config, first_mover_wins_map(), first_move_entrants()).unwrap();

    let control = tournament.control();
    control.pause();
    let resumer = {
        let control = control.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(250));
            control.resume();
        })
    };

    let start = Instant::now();
    let report = tournament.run(&mut ThreadScheduler);
    resumer.join().unwrap();

    assert!(report.completed);
    assert!(start.elapsed() >= Duration::from_millis(200));
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[test]
fn test_results_append_across_runs() {
    let dir = scratch_dir("persist");
    let store = ResultStore::new(dir.join("results.csv"));

    for _ in 0..2 {
        let config = TournamentConfig::new(1).with_first_player(Player::Black);
        let mut tournament =
            Tournament::with_entrants(config, first_mover_wins_map(), first_move_entrants()).unwrap();
        let report = tournament.run(&mut NoWait);
        assert!(store.append_or_print(&report.rows(tournament.config())));
    }

    let content = std::fs::read_to_string(store.path()).unwrap();
    assert_eq!(content.lines().filter(|l| *l == CSV_HEADER).count(), 1);
    assert_eq!(content.lines().count(), 5);

    let history = store.history().unwrap();
    assert_eq!(history.len(), 2);
    for entry in &history {
        assert_eq!((entry.wins, entry.losses, entry.total_games), (2, 2, 4));
        assert!((entry.avg_pieces - 1.5).abs() < 1e-9);
    }
}

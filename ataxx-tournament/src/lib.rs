//! Ataxx Tournament - head-to-head evaluation of strategies
//!
//! This crate provides tournament infrastructure:
//! - Agent registry (identity names to strategies)
//! - The hybrid alpha-beta/MCTS dispatcher
//! - A cancellable, pausable game loop
//! - Double round-robin with validation and CSV persistence
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: Tournament::run (orchestration)
//! - Level 2: rounds, reporting (phases)
//! - Level 3: GameSession::step, tally (steps)
//! - Level 4: configuration, registry, maps

mod agents;
mod config;
mod control;
mod game_runner;
mod hybrid;
mod maps;
mod report;
mod tournament;

pub use agents::{AgentKind, AgentSpec};
pub use config::{ConfigError, TournamentConfig};
pub use control::{RunControl, Scheduler, ThreadScheduler, SUSPEND_SLICE};
pub use game_runner::{play_game, Entrant, GameOutcome, GameSession, Step, PAUSE_POLL, STALL_LIMIT};
pub use hybrid::{HybridAgent, Phase};
pub use maps::{LoadedMap, MapCatalog, DEFAULT_MAP_ID};
pub use report::{HistoryEntry, ResultRow, ResultStore, CSV_HEADER};
pub use tournament::{validate, AgentRecord, GameRecord, Tournament, TournamentReport, ValidationIssue};

//! Configuration types for tournament play
//!
//! Level 4 - Utilities and configuration

use std::path::PathBuf;
use std::time::Duration;

use ataxx_core::Player;
use thiserror::Error;

/// Errors raised while setting up a tournament, before any game starts
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown agent '{0}' (expected Minimax*, MCTS[_<n>], MCTS_Domain[_<n>] or AB+MCTS_Domain[_<n>])")]
    UnknownAgent(String),
    #[error("both agents are named '{0}'; tournament identities must differ")]
    DuplicateAgent(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tournament configuration
#[derive(Clone, Debug)]
pub struct TournamentConfig {
    /// Search depth for the tactical strategy
    pub depth: u32,
    /// Default iteration budget for sampling strategies
    pub iterations: u32,
    /// Empty-cell count at or below which the hybrid agent samples
    pub transition_threshold: usize,
    /// Games per round (each round swaps colours)
    pub games_per_match: u32,
    /// Colour that moves first in every game
    pub first_player: Player,
    /// Pause after each applied move
    pub move_delay: Duration,
    /// Pause after each finished game
    pub result_pause: Duration,
    /// Tournament-style root selection for sampling strategies
    pub use_tournament: bool,
    /// Base seed; each agent derives its own from it
    pub seed: u64,
    /// Directory holding `*.txt` layouts
    pub map_dir: PathBuf,
    /// Layout file name inside `map_dir` (None = default layout)
    pub map_file: Option<String>,
    /// CSV store results are appended to
    pub results_path: PathBuf,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            depth: 4,
            iterations: 300,
            transition_threshold: 13,
            games_per_match: 5,
            first_player: Player::White,
            move_delay: Duration::ZERO,
            result_pause: Duration::ZERO,
            use_tournament: false,
            seed: 42,
            map_dir: PathBuf::from("map"),
            map_file: None,
            results_path: PathBuf::from("results.csv"),
        }
    }
}

impl TournamentConfig {
    /// Create config with the given number of games per round
    pub fn new(games_per_match: u32) -> Self {
        Self {
            games_per_match,
            ..Default::default()
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.transition_threshold = threshold;
        self
    }

    pub fn with_first_player(mut self, player: Player) -> Self {
        self.first_player = player;
        self
    }

    pub fn with_delays(mut self, move_delay: Duration, result_pause: Duration) -> Self {
        self.move_delay = move_delay;
        self.result_pause = result_pause;
        self
    }

    pub fn with_tournament_selection(mut self, enabled: bool) -> Self {
        self.use_tournament = enabled;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_map(mut self, map_dir: impl Into<PathBuf>, map_file: Option<String>) -> Self {
        self.map_dir = map_dir.into();
        self.map_file = map_file;
        self
    }

    pub fn with_results_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.results_path = path.into();
        self
    }

    /// Total games across both rounds
    pub fn total_games(&self) -> u32 {
        self.games_per_match * 2
    }

    /// Reject settings no tournament can run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.games_per_match == 0 {
            return Err(ConfigError::Invalid("games per match must be at least 1".into()));
        }
        if self.depth == 0 {
            return Err(ConfigError::Invalid("search depth must be at least 1".into()));
        }
        if self.iterations == 0 {
            return Err(ConfigError::Invalid("iterations must be at least 1".into()));
        }
        Ok(())
    }
}

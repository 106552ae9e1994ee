//! Ataxx MCTS - Monte Carlo Tree Search agents
//!
//! This crate provides sampling-based move selection:
//! - Tree policy (UCB1)
//! - Random and domain-guided rollouts
//! - Backpropagation and root move choice

pub mod rollout;
pub mod search;
pub mod tree;

pub use rollout::RolloutPolicy;
pub use search::{run_search, MoveStatistics, SearchResult};
pub use tree::{Edge, MctsNode, MctsTree, NodeId, NodeStats};

use ataxx_core::{Agent, GameState, Move, ScoreBoard};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// MCTS configuration
#[derive(Clone, Debug)]
pub struct MctsConfig {
    pub iterations: u32,
    pub exploration: f32,
    pub rollout: RolloutPolicy,
    pub max_rollout_depth: u32,
    /// Probability that a domain rollout plays the greedy move
    pub greedy_rate: f32,
    /// Pick the root move by tournament among the most visited children
    pub tournament: bool,
    pub tournament_size: usize,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self::baseline(300)
    }
}

impl MctsConfig {
    /// Uniformly random rollouts
    pub fn baseline(iterations: u32) -> Self {
        Self {
            iterations,
            exploration: 1.41, // sqrt(2)
            rollout: RolloutPolicy::Random,
            max_rollout_depth: 200,
            greedy_rate: 0.0,
            tournament: false,
            tournament_size: 4,
        }
    }

    /// Greedy-biased rollouts, capped early and scored by piece share
    pub fn domain(iterations: u32) -> Self {
        Self {
            rollout: RolloutPolicy::Domain,
            max_rollout_depth: 60,
            greedy_rate: 0.9,
            ..Self::baseline(iterations)
        }
    }

    pub fn with_tournament(mut self, enabled: bool) -> Self {
        self.tournament = enabled;
        self
    }
}

/// MCTS player
pub struct MctsPlayer {
    config: MctsConfig,
    rng: ChaCha8Rng,
}

impl MctsPlayer {
    pub fn new(config: MctsConfig) -> Self {
        Self::with_seed(config, 42)
    }

    pub fn with_seed(config: MctsConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Run a search and return its root statistics
    pub fn search(&mut self, state: &GameState) -> SearchResult {
        run_search(state, &self.config, &mut self.rng)
    }

    /// Get best move using MCTS
    pub fn best_move(&mut self, state: &GameState) -> Option<Move> {
        let result = self.search(state);
        self.choose(&result)
    }

    fn choose(&self, result: &SearchResult) -> Option<Move> {
        if self.config.tournament {
            result.tournament_move(self.config.tournament_size)
        } else {
            result.highest_winrate_move()
        }
    }
}

impl Agent for MctsPlayer {
    fn name(&self) -> &str {
        match self.config.rollout {
            RolloutPolicy::Random => "MCTS",
            RolloutPolicy::Domain => "MCTS_Domain",
        }
    }

    fn select_move(&mut self, state: &GameState, scores: &ScoreBoard) -> Option<Move> {
        if state.legal_moves().is_empty() {
            return None;
        }
        let result = self.search(state);
        scores.record_many(result.move_stats.iter().map(|s| (s.mv, s.win_rate)));
        self.choose(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ataxx_core::{Board, Player};

    #[test]
    fn test_player_returns_legal_move() {
        let state = GameState::new(Board::default_layout(), Player::White);
        let mut player = MctsPlayer::new(MctsConfig::baseline(50));
        let mv = player.best_move(&state).unwrap();
        assert!(state.is_legal(mv));
    }

    #[test]
    fn test_domain_player_takes_winning_capture() {
        let board = Board::parse("B.W....\n..W....\n.......\n.......\n.......\n.......\n......B").unwrap();
        let state = GameState::new(board, Player::Black);
        let mut player = MctsPlayer::with_seed(MctsConfig::domain(400), 9);
        let mv = player.best_move(&state).unwrap();
        assert_eq!(state.apply_move(mv).result(), ataxx_core::GameResult::BlackWins);
    }

    #[test]
    fn test_publishes_win_rates_when_enabled() {
        let state = GameState::new(Board::default_layout(), Player::Black);
        let scores = ScoreBoard::new();
        scores.enable("MCTS");

        let mut player = MctsPlayer::new(MctsConfig::baseline(40));
        player.select_move(&state, &scores);

        let published = scores.read_all();
        assert!(!published.is_empty());
        assert!(published.values().all(|&r| (0.0..=1.0).contains(&r)));
    }

    #[test]
    fn test_no_moves_returns_none() {
        let sealed = Board::parse("B######\n#######\n#######\n###.###\n#######\n#######\n######W").unwrap();
        let state = GameState::new(sealed, Player::Black);
        let mut player = MctsPlayer::new(MctsConfig::domain(10));
        assert!(player.select_move(&state, &ScoreBoard::new()).is_none());
    }

    #[test]
    fn test_agent_names() {
        assert_eq!(MctsPlayer::new(MctsConfig::baseline(1)).name(), "MCTS");
        assert_eq!(MctsPlayer::new(MctsConfig::domain(1)).name(), "MCTS_Domain");
    }
}

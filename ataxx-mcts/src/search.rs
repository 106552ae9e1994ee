//! MCTS Search Loop
//!
//! Implements the core MCTS algorithm:
//! 1. Selection - Use UCB1 to traverse tree
//! 2. Expansion - Add child node
//! 3. Simulation - Rollout to terminal state
//! 4. Backpropagation - Update statistics
//!
//! ## Architecture
//! - Level 2: Search loop coordination
//! - Level 3: Individual MCTS phases and root move choice

use crate::rollout::{black_reward, rollout};
use crate::tree::{MctsTree, NodeId};
use crate::MctsConfig;
use ataxx_core::{GameState, Move};
use rand::Rng;

// ============================================================================
// SEARCH RESULT
// ============================================================================

/// Statistics for a single move at root
#[derive(Clone, Debug)]
pub struct MoveStatistics {
    pub mv: Move,
    pub visits: u32,
    pub win_rate: f32,
}

/// Result of MCTS search
#[derive(Debug)]
pub struct SearchResult {
    /// The final tree after search
    pub tree: MctsTree,
    /// Total simulations performed
    pub total_simulations: u32,
    /// Statistics for each root move
    pub move_stats: Vec<MoveStatistics>,
}

impl SearchResult {
    /// Move with the highest win rate (ties: more visits)
    pub fn highest_winrate_move(&self) -> Option<Move> {
        best_by_winrate(self.move_stats.iter())
    }

    /// Tournament among the `size` most-visited root moves, won by win rate
    pub fn tournament_move(&self, size: usize) -> Option<Move> {
        let mut by_visits: Vec<&MoveStatistics> = self.move_stats.iter().collect();
        by_visits.sort_by(|a, b| b.visits.cmp(&a.visits));
        by_visits.truncate(size.max(1));
        best_by_winrate(by_visits.into_iter())
    }
}

fn best_by_winrate<'a>(stats: impl Iterator<Item = &'a MoveStatistics>) -> Option<Move> {
    stats
        .max_by(|a, b| {
            a.win_rate
                .partial_cmp(&b.win_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.visits.cmp(&b.visits))
        })
        .map(|s| s.mv)
}

// ============================================================================
// SEARCH LOOP (Level 2 - Main Coordination)
// ============================================================================

/// Run MCTS search from `root_state`
pub fn run_search<R: Rng>(root_state: &GameState, config: &MctsConfig, rng: &mut R) -> SearchResult {
    let mut tree = MctsTree::new(root_state.clone());

    for _ in 0..config.iterations {
        run_single_iteration(&mut tree, config, rng);
    }

    let move_stats = tree
        .move_statistics()
        .into_iter()
        .map(|(mv, visits, win_rate)| MoveStatistics { mv, visits, win_rate })
        .collect();

    SearchResult {
        total_simulations: tree.total_simulations(),
        tree,
        move_stats,
    }
}

// ============================================================================
// SINGLE ITERATION (Level 3)
// ============================================================================

fn run_single_iteration<R: Rng>(tree: &mut MctsTree, config: &MctsConfig, rng: &mut R) {
    // Phase 1: Selection
    let leaf_id = tree.select_leaf(config.exploration);

    // Phase 2: Expansion (if not terminal)
    let simulation_node = if tree.get(leaf_id).is_terminal() {
        leaf_id
    } else {
        tree.expand(leaf_id, rng).unwrap_or(leaf_id)
    };

    // Phase 3: Simulation
    let reward = simulate_node(tree, simulation_node, config, rng);

    // Phase 4: Backpropagation
    tree.backpropagate(simulation_node, reward);
}

fn simulate_node<R: Rng>(tree: &MctsTree, node_id: NodeId, config: &MctsConfig, rng: &mut R) -> f32 {
    let node = tree.get(node_id);
    if node.is_terminal() {
        return black_reward(&node.state);
    }
    rollout(
        &node.state,
        config.rollout,
        config.max_rollout_depth,
        config.greedy_rate,
        rng,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ataxx_core::{Board, Player};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn stats(mv: Move, visits: u32, win_rate: f32) -> MoveStatistics {
        MoveStatistics { mv, visits, win_rate }
    }

    #[test]
    fn test_search_visits_every_root_move() {
        let state = GameState::new(Board::default_layout(), Player::Black);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let result = run_search(&state, &MctsConfig::baseline(64), &mut rng);

        assert_eq!(result.total_simulations, 64);
        assert_eq!(result.move_stats.len(), 16);
        assert!(result.move_stats.iter().all(|s| s.visits >= 1));
    }

    #[test]
    fn test_winrate_and_tournament_choice() {
        let a = Move::new(0, 0, 0, 1);
        let b = Move::new(0, 0, 1, 1);
        let c = Move::new(0, 0, 2, 2);
        let result = SearchResult {
            tree: MctsTree::new(GameState::new(Board::default_layout(), Player::Black)),
            total_simulations: 0,
            move_stats: vec![stats(a, 50, 0.6), stats(b, 40, 0.55), stats(c, 1, 1.0)],
        };

        // A single lucky visit wins on raw win rate
        assert_eq!(result.highest_winrate_move(), Some(c));
        // Among the two most visited, the better win rate wins
        assert_eq!(result.tournament_move(2), Some(a));
    }

    #[test]
    fn test_winrate_ties_prefer_visits() {
        let a = Move::new(0, 0, 0, 1);
        let b = Move::new(0, 0, 1, 1);
        let result = SearchResult {
            tree: MctsTree::new(GameState::new(Board::default_layout(), Player::Black)),
            total_simulations: 0,
            move_stats: vec![stats(a, 5, 0.5), stats(b, 9, 0.5)],
        };
        assert_eq!(result.highest_winrate_move(), Some(b));
    }
}

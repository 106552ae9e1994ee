//! Rollout (simulation) strategies for MCTS
//!
//! ## Architecture
//! - Level 3: Single rollout implementation
//! - Level 4: Move selection and scoring

use ataxx_core::{move_gain, piece_share, GameResult, GameState, Move, Player};
use rand::prelude::*;

/// How rollout moves are chosen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RolloutPolicy {
    /// Uniformly random legal moves
    Random,
    /// Mostly greedy on immediate gain, random otherwise
    Domain,
}

// ============================================================================
// ROLLOUT (Level 3 - Single Rollout)
// ============================================================================

/// Play out from `state` and return black's reward in [0, 1].
///
/// Stops at a terminal position or after `max_depth` plies; a capped
/// rollout is scored by black's share of the pieces.
pub fn rollout<R: Rng>(
    state: &GameState,
    policy: RolloutPolicy,
    max_depth: u32,
    greedy_rate: f32,
    rng: &mut R,
) -> f32 {
    let mut current = state.clone();
    let mut plies = 0;

    while !current.is_game_over() && plies < max_depth {
        let moves = current.legal_moves();
        if moves.is_empty() {
            current.pass();
        } else {
            let mv = match policy {
                RolloutPolicy::Random => select_random_move(&moves, rng),
                RolloutPolicy::Domain => select_domain_move(&current, &moves, greedy_rate, rng),
            };
            current.play(mv);
        }
        plies += 1;
    }

    black_reward(&current)
}

/// Reward for black at the end of a rollout
pub fn black_reward(state: &GameState) -> f32 {
    match state.result() {
        GameResult::BlackWins => 1.0,
        GameResult::WhiteWins => 0.0,
        GameResult::Draw => 0.5,
        GameResult::Ongoing => piece_share(state, Player::Black),
    }
}

// ============================================================================
// MOVE SELECTION (Level 4)
// ============================================================================

fn select_random_move<R: Rng>(moves: &[Move], rng: &mut R) -> Move {
    moves[rng.gen_range(0..moves.len())]
}

/// Greedy on immediate gain with probability `greedy_rate`; ties broken randomly
fn select_domain_move<R: Rng>(
    state: &GameState,
    moves: &[Move],
    greedy_rate: f32,
    rng: &mut R,
) -> Move {
    if rng.gen::<f32>() >= greedy_rate {
        return select_random_move(moves, rng);
    }

    let gains: Vec<i32> = moves.iter().map(|&mv| move_gain(state, mv)).collect();
    let best = gains.iter().copied().max().unwrap_or(0);
    let candidates: Vec<Move> = moves
        .iter()
        .zip(&gains)
        .filter(|(_, &g)| g == best)
        .map(|(&mv, _)| mv)
        .collect();

    select_random_move(&candidates, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ataxx_core::Board;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_rollout_reward_in_range() {
        let state = GameState::new(Board::default_layout(), Player::Black);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..5 {
            let r = rollout(&state, RolloutPolicy::Random, 200, 0.0, &mut rng);
            assert!((0.0..=1.0).contains(&r));
        }
    }

    #[test]
    fn test_domain_rollout_takes_obvious_win() {
        // Greedy play flips both white pieces on the first ply
        let board = Board::parse("B.W....\n..W....\n.......\n.......\n.......\n.......\n.......").unwrap();
        let state = GameState::new(board, Player::Black);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let r = rollout(&state, RolloutPolicy::Domain, 60, 1.0, &mut rng);
        assert_eq!(r, 1.0);
    }

    #[test]
    fn test_capped_rollout_scores_piece_share() {
        let state = GameState::new(Board::default_layout(), Player::Black);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(rollout(&state, RolloutPolicy::Random, 0, 0.0, &mut rng), 0.5);
    }
}

//! CPU-based Alpha-Beta AI

use crate::agent::Agent;
use crate::eval::{evaluate_with_depth, move_gain};
use crate::game::{GameState, Move};
use crate::scores::ScoreBoard;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Noise scale for evaluation variety (breaks ties only)
const NOISE_SCALE: f32 = 0.1;

// ============================================================================
// ALPHA-BETA AI
// ============================================================================

/// Bounded-depth negamax with alpha-beta pruning
pub struct AlphaBetaAI {
    pub depth: u32,
    rng: ChaCha8Rng,
}

impl AlphaBetaAI {
    pub fn new(depth: u32) -> Self {
        Self::with_seed(depth, 42)
    }

    pub fn with_seed(depth: u32, seed: u64) -> Self {
        Self {
            depth,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Get best move for current position, with the score of every root move
    pub fn search(&mut self, state: &GameState) -> Option<(Move, Vec<(Move, f32)>)> {
        let mut moves = state.legal_moves();
        if moves.is_empty() {
            return None;
        }
        order_moves(state, &mut moves);

        let depth = self.depth.max(1) as i32;
        let mut alpha = f32::NEG_INFINITY;
        let mut best_move = moves[0];
        let mut root_scores = Vec::with_capacity(moves.len());

        for mv in moves {
            let child = state.apply_move(mv);
            // Full window for every root move so published scores are exact
            let score = -negamax(&child, depth - 1, f32::NEG_INFINITY, f32::INFINITY, &mut self.rng);
            root_scores.push((mv, score));

            if score > alpha {
                alpha = score;
                best_move = mv;
            }
        }

        Some((best_move, root_scores))
    }

    pub fn best_move(&mut self, state: &GameState) -> Option<Move> {
        self.search(state).map(|(mv, _)| mv)
    }
}

impl Agent for AlphaBetaAI {
    fn name(&self) -> &str {
        "Minimax"
    }

    fn select_move(&mut self, state: &GameState, scores: &ScoreBoard) -> Option<Move> {
        let (mv, root_scores) = self.search(state)?;
        scores.record_many(root_scores);
        Some(mv)
    }
}

// ============================================================================
// MOVE ORDERING
// ============================================================================

/// Sort moves so the largest immediate gains are searched first
fn order_moves(state: &GameState, moves: &mut [Move]) {
    moves.sort_by_key(|&mv| std::cmp::Reverse(move_gain(state, mv)));
}

// ============================================================================
// NEGAMAX WITH ALPHA-BETA
// ============================================================================

fn negamax(
    state: &GameState,
    depth: i32,
    mut alpha: f32,
    beta: f32,
    rng: &mut ChaCha8Rng,
) -> f32 {
    let me = state.current_player();

    if state.is_game_over() {
        return evaluate_with_depth(state, me, depth);
    }

    if depth <= 0 {
        let base = evaluate_with_depth(state, me, 0);
        let noise = (rng.gen::<f32>() - 0.5) * NOISE_SCALE;
        return base + noise;
    }

    let mut moves = state.legal_moves();
    if moves.is_empty() {
        let mut passed = state.clone();
        passed.pass();
        return -negamax(&passed, depth - 1, -beta, -alpha, rng);
    }
    order_moves(state, &mut moves);

    let mut best = f32::NEG_INFINITY;
    for mv in moves {
        let child = state.apply_move(mv);
        let score = -negamax(&child, depth - 1, -beta, -alpha, rng);

        best = best.max(score);
        alpha = alpha.max(score);
        if alpha >= beta {
            break;
        }
    }

    best
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::eval::WIN_VALUE;
    use crate::game::Player;

    #[test]
    fn test_ai_returns_move() {
        let state = GameState::new(Board::default_layout(), Player::Black);
        let mut ai = AlphaBetaAI::new(2);
        let mv = ai.best_move(&state).unwrap();
        assert!(state.is_legal(mv));
    }

    #[test]
    fn test_ai_takes_winning_capture() {
        // Cloning next to both white pieces flips them and ends the game
        let board = Board::parse("B.W....\n..W....\n.......\n.......\n.......\n.......\n......B").unwrap();
        let state = GameState::new(board, Player::Black);

        let mut ai = AlphaBetaAI::new(2);
        let (mv, scores) = ai.search(&state).unwrap();
        assert_eq!(state.apply_move(mv).result(), crate::game::GameResult::BlackWins);
        let best = scores.iter().map(|(_, s)| *s).fold(f32::NEG_INFINITY, f32::max);
        assert!(best >= WIN_VALUE);
    }

    #[test]
    fn test_no_moves_returns_none() {
        let sealed = Board::parse("B######\n#######\n#######\n###.###\n#######\n#######\n######W").unwrap();
        let state = GameState::new(sealed, Player::Black);
        assert!(AlphaBetaAI::new(3).best_move(&state).is_none());
    }

    #[test]
    fn test_publishes_root_scores_when_enabled() {
        let state = GameState::new(Board::default_layout(), Player::Black);
        let scores = ScoreBoard::new();
        let mut ai = AlphaBetaAI::new(1);

        ai.select_move(&state, &scores);
        assert!(scores.read_all().is_empty());

        scores.enable("Minimax");
        ai.select_move(&state, &scores);
        assert_eq!(scores.read_all().len(), state.legal_moves().len());
    }

    #[test]
    fn test_search_does_not_mutate_state() {
        let state = GameState::new(Board::default_layout(), Player::White);
        let before = state.board().clone();
        AlphaBetaAI::new(2).best_move(&state);
        assert_eq!(state.board(), &before);
        assert_eq!(state.current_player(), Player::White);
    }
}

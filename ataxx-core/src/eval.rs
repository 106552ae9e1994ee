//! Position evaluation

use crate::board::{Cell, NEIGHBOURS};
use crate::game::{GameResult, GameState, Move, Player};

/// Win value (effectively infinite)
pub const WIN_VALUE: f32 = 10000.0;

/// Piece difference from `perspective`'s point of view; terminal positions
/// score `±WIN_VALUE` (0 for a draw)
pub fn evaluate(state: &GameState, perspective: Player) -> f32 {
    match state.result() {
        GameResult::Ongoing => {}
        GameResult::Draw => return 0.0,
        result => {
            return if result.winner() == Some(perspective) {
                WIN_VALUE
            } else {
                -WIN_VALUE
            };
        }
    }

    state.pieces(perspective) as f32 - state.pieces(perspective.opponent()) as f32
}

/// Evaluate with a depth bonus so faster wins (and slower losses) score higher
pub fn evaluate_with_depth(state: &GameState, perspective: Player, depth: i32) -> f32 {
    let base = evaluate(state, perspective);
    if base >= WIN_VALUE {
        base + depth as f32
    } else if base <= -WIN_VALUE {
        base - depth as f32
    } else {
        base
    }
}

/// Fraction of pieces on the board owned by `player`, in [0, 1]
pub fn piece_share(state: &GameState, player: Player) -> f32 {
    let mine = state.pieces(player) as f32;
    let total = mine + state.pieces(player.opponent()) as f32;
    if total == 0.0 {
        0.5
    } else {
        mine / total
    }
}

/// Immediate material gain of a move for the side to move.
///
/// Counts flipped enemy pieces plus one for a clone's new piece.
pub fn move_gain(state: &GameState, mv: Move) -> i32 {
    let them = Cell::Piece(state.current_player().opponent());
    let flips = NEIGHBOURS
        .iter()
        .filter_map(|&(dr, dc)| mv.to.offset(dr, dc))
        .filter(|&pos| state.board().get(pos) == them)
        .count() as i32;

    flips + i32::from(mv.is_clone())
}

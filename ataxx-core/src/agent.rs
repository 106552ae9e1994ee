//! Agent capability shared by every strategy

use crate::game::{GameState, Move};
use crate::scores::ScoreBoard;

/// A move-producing strategy.
///
/// `select_move` must not mutate the state it is handed and returns `None`
/// only when the side to move has no legal move. Strategies may publish
/// their root evaluations to `scores`, but must never depend on anyone
/// reading them.
pub trait Agent: Send {
    /// Short strategy name used in logs and score labels
    fn name(&self) -> &str;

    /// Choose a move for the side to move
    fn select_move(&mut self, state: &GameState, scores: &ScoreBoard) -> Option<Move>;
}

impl<A: Agent + ?Sized> Agent for Box<A> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn select_move(&mut self, state: &GameState, scores: &ScoreBoard) -> Option<Move> {
        (**self).select_move(state, scores)
    }
}

/// Always plays the first legal move. Deterministic baseline for fixtures.
#[derive(Clone, Debug, Default)]
pub struct FirstMoveAgent;

impl Agent for FirstMoveAgent {
    fn name(&self) -> &str {
        "FirstMove"
    }

    fn select_move(&mut self, state: &GameState, _scores: &ScoreBoard) -> Option<Move> {
        state.legal_moves().first().copied()
    }
}

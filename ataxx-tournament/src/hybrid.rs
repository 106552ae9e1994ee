//! Hybrid dispatch agent
//!
//! Delegates each turn to a tactical strategy while the board is open and
//! to a sampling strategy once it fills up. The choice depends only on the
//! empty-cell count of the position it is handed.

use ataxx_core::{Agent, GameState, Move, ScoreBoard};
use tracing::debug;

/// Which wrapped strategy a position is routed to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Tactical,
    Sampling,
}

impl Phase {
    /// `Tactical` iff more than `threshold` cells are empty
    pub fn for_state(state: &GameState, threshold: usize) -> Self {
        if state.empty_cells() > threshold {
            Phase::Tactical
        } else {
            Phase::Sampling
        }
    }
}

pub struct HybridAgent {
    name: String,
    threshold: usize,
    tactical: Box<dyn Agent>,
    sampling: Box<dyn Agent>,
}

impl HybridAgent {
    pub fn new(
        name: &str,
        threshold: usize,
        tactical: Box<dyn Agent>,
        sampling: Box<dyn Agent>,
    ) -> Self {
        Self {
            name: name.to_string(),
            threshold,
            tactical,
            sampling,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

impl Agent for HybridAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&mut self, state: &GameState, scores: &ScoreBoard) -> Option<Move> {
        let phase = Phase::for_state(state, self.threshold);
        let delegate = match phase {
            Phase::Tactical => &mut self.tactical,
            Phase::Sampling => &mut self.sampling,
        };

        // Observers attribute the published scores to the strategy in use
        scores.relabel(&format!("{}(using {})", self.name, delegate.name()));
        debug!(
            agent = %self.name,
            empty = state.empty_cells(),
            threshold = self.threshold,
            delegate = delegate.name(),
            "hybrid dispatch"
        );

        delegate.select_move(state, scores)
    }
}

//! Move score broadcast
//!
//! A shared, turn-scoped store of move evaluations. Strategies publish their
//! root scores here while they think; observers (a renderer, a log watcher)
//! read snapshots without the strategy knowing they exist. Collection is
//! enabled for exactly one named agent at a time and every operation takes
//! the lock once, so a reader never sees a half-written turn.

use crate::board::Coord;
use crate::game::Move;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct ScoreState {
    enabled: bool,
    agent: String,
    scores: FxHashMap<Move, f32>,
}

/// Cloneable handle to a shared score store
#[derive(Clone, Debug, Default)]
pub struct ScoreBoard {
    inner: Arc<Mutex<ScoreState>>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ScoreState> {
        // A panicking writer cannot leave the map half-updated: every
        // mutation is a single insert/extend/clear under the lock.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Clear previous entries and start collecting for `agent`
    pub fn enable(&self, agent: &str) {
        let mut state = self.lock();
        state.scores.clear();
        state.enabled = true;
        state.agent = agent.to_string();
    }

    /// Stop collecting. Entries stay readable until the next enable/clear.
    pub fn disable(&self) {
        let mut state = self.lock();
        state.enabled = false;
        state.agent.clear();
    }

    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    /// Name of the agent currently thinking (empty when disabled)
    pub fn current_agent(&self) -> String {
        self.lock().agent.clone()
    }

    /// Replace the thinking label, only while collection is active
    pub fn relabel(&self, label: &str) {
        let mut state = self.lock();
        if state.enabled {
            state.agent = label.to_string();
        }
    }

    pub fn record(&self, mv: Move, score: f32) {
        let mut state = self.lock();
        if state.enabled {
            state.scores.insert(mv, score);
        }
    }

    pub fn record_many<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (Move, f32)>,
    {
        let mut state = self.lock();
        if state.enabled {
            state.scores.extend(entries);
        }
    }

    /// Copy of all current entries
    pub fn read_all(&self) -> FxHashMap<Move, f32> {
        self.lock().scores.clone()
    }

    pub fn get(&self, mv: Move) -> Option<f32> {
        self.lock().scores.get(&mv).copied()
    }

    pub fn clear(&self) {
        self.lock().scores.clear();
    }

    /// Best score per destination cell, regardless of source
    pub fn best_destination(&self) -> BTreeMap<Coord, f32> {
        let state = self.lock();
        let mut best: BTreeMap<Coord, f32> = BTreeMap::new();
        for (mv, &score) in &state.scores {
            best.entry(mv.to)
                .and_modify(|s| {
                    if score > *s {
                        *s = score;
                    }
                })
                .or_insert(score);
        }
        best
    }

    /// Single highest-scoring destination. Ties go to the lowest row, then column.
    pub fn top_destination(&self) -> Option<(Coord, f32)> {
        self.best_destination()
            .into_iter()
            .fold(None, |acc: Option<(Coord, f32)>, (pos, score)| match acc {
                Some((_, best)) if best >= score => acc,
                _ => Some((pos, score)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_enable_record_disable_read() {
        let board = ScoreBoard::new();
        board.enable("X");
        assert_eq!(board.current_agent(), "X");
        board.record(Move::new(0, 0, 1, 1), 0.4);
        board.record(Move::new(0, 0, 1, 1), 0.6);
        board.record_many([(Move::new(0, 0, 2, 2), 0.9)]);
        board.disable();

        let all = board.read_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[&Move::new(0, 0, 1, 1)], 0.6);
        assert_eq!(board.current_agent(), "");
        assert!(!board.is_enabled());
    }

    #[test]
    fn test_record_while_disabled_is_noop() {
        let board = ScoreBoard::new();
        board.record(Move::new(0, 0, 1, 1), 0.4);
        board.record_many([(Move::new(0, 0, 2, 2), 0.9)]);
        assert!(board.read_all().is_empty());
    }

    #[test]
    fn test_enable_clears_previous_turn() {
        let board = ScoreBoard::new();
        board.enable("A");
        board.record(Move::new(0, 0, 1, 1), 0.4);
        board.disable();
        board.enable("B");
        assert!(board.read_all().is_empty());
    }

    #[test]
    fn test_clear_empties_store() {
        let board = ScoreBoard::new();
        board.enable("A");
        board.record(Move::new(0, 0, 1, 1), 0.4);
        board.clear();
        assert!(board.read_all().is_empty());
    }

    #[test]
    fn test_relabel_only_while_enabled() {
        let board = ScoreBoard::new();
        board.relabel("ignored");
        assert_eq!(board.current_agent(), "");
        board.enable("Hybrid");
        board.relabel("Hybrid(using Minimax)");
        assert_eq!(board.current_agent(), "Hybrid(using Minimax)");
    }

    #[test]
    fn test_best_destination() {
        let board = ScoreBoard::new();
        board.enable("X");
        board.record(Move::new(0, 0, 1, 1), 0.4);
        board.record(Move::new(0, 0, 2, 2), 0.9);
        board.record(Move::new(3, 3, 2, 2), 0.2);

        let best = board.best_destination();
        assert_eq!(best.len(), 2);
        assert_eq!(best[&Coord::new(2, 2)], 0.9);
        assert_eq!(best[&Coord::new(1, 1)], 0.4);
        assert_eq!(board.top_destination(), Some((Coord::new(2, 2), 0.9)));
    }

    #[test]
    fn test_top_destination_tie_prefers_lowest_cell() {
        let board = ScoreBoard::new();
        board.enable("X");
        board.record(Move::new(4, 4, 5, 5), 0.7);
        board.record(Move::new(0, 0, 1, 2), 0.7);
        board.record(Move::new(0, 0, 1, 1), 0.7);
        assert_eq!(board.top_destination(), Some((Coord::new(1, 1), 0.7)));
    }

    #[test]
    fn test_concurrent_reader_sees_whole_turns() {
        let board = ScoreBoard::new();
        let reader = board.clone();

        let handle = thread::spawn(move || {
            for _ in 0..500 {
                let snapshot = reader.read_all();
                // Each turn records exactly four entries in one call
                assert!(snapshot.is_empty() || snapshot.len() == 4);
            }
        });

        for turn in 0..500u32 {
            board.enable("writer");
            let score = turn as f32;
            board.record_many((0..4).map(|c| (Move::new(0, 0, 1, c), score)));
            board.disable();
        }

        handle.join().unwrap();
    }
}

//! Game runner - executes single games
//!
//! Level 3 - Step-level implementation
//!
//! `GameSession::step` is the whole turn loop as an explicit state machine:
//! each call does at most one agent turn and reports whether the caller
//! should continue, wait, or stop. `play_game` drives it with a `Scheduler`.

use std::time::Duration;

use ataxx_core::{Agent, GameResult, GameState, Move, Player, ScoreBoard};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::control::{RunControl, Scheduler};

/// Poll interval while the run is paused
pub const PAUSE_POLL: Duration = Duration::from_millis(100);

/// Consecutive forced passes after which the untouched position has been
/// seen three times with the same side to move; the game is drawn
pub const STALL_LIMIT: u32 = 4;

/// A named participant: results are keyed by `name`, not by strategy
pub struct Entrant {
    pub name: String,
    pub agent: Box<dyn Agent>,
}

impl Entrant {
    pub fn new(name: impl Into<String>, agent: Box<dyn Agent>) -> Self {
        Self {
            name: name.into(),
            agent,
        }
    }
}

/// Outcome of a single completed game
#[derive(Clone, Debug, Serialize)]
pub struct GameOutcome {
    pub result: GameResult,
    /// Identity playing black (X)
    pub black: String,
    /// Identity playing white (O)
    pub white: String,
    pub black_pieces: usize,
    pub white_pieces: usize,
    /// Moves applied (passes excluded)
    pub moves: u32,
    /// Turns where an agent returned no move or an illegal one despite legal moves
    pub forced_passes: u32,
}

impl GameOutcome {
    /// +1 black, -1 white, 0 draw
    pub fn winner_sign(&self) -> i8 {
        self.result.winner_sign()
    }

    pub fn winner_name(&self) -> Option<&str> {
        self.result.winner().map(|p| self.name_of(p))
    }

    pub fn loser_name(&self) -> Option<&str> {
        self.result.winner().map(|p| self.name_of(p.opponent()))
    }

    pub fn name_of(&self, player: Player) -> &str {
        match player {
            Player::Black => &self.black,
            Player::White => &self.white,
        }
    }

    pub fn pieces_of(&self, player: Player) -> usize {
        match player {
            Player::Black => self.black_pieces,
            Player::White => self.white_pieces,
        }
    }
}

/// What the driver should do after a step
#[derive(Clone, Debug)]
pub enum Step {
    /// Call `step` again right away
    Continue,
    /// Suspend for the given time, then call `step` again
    Wait(Duration),
    Finished(GameOutcome),
    /// The run was cancelled; no result is recorded
    Abandoned,
}

/// Disables score collection when dropped, so a turn is always bracketed
struct CollectionGuard<'a> {
    scores: &'a ScoreBoard,
}

impl<'a> CollectionGuard<'a> {
    fn open(scores: &'a ScoreBoard, agent: &str) -> Self {
        scores.enable(agent);
        Self { scores }
    }
}

impl Drop for CollectionGuard<'_> {
    fn drop(&mut self) {
        self.scores.disable();
    }
}

/// One game between two entrants
pub struct GameSession<'a> {
    state: GameState,
    black: &'a mut Entrant,
    white: &'a mut Entrant,
    scores: &'a ScoreBoard,
    control: &'a RunControl,
    move_delay: Duration,
    moves: u32,
    forced_passes: u32,
    /// Forced passes since the last applied move
    stalled: u32,
}

impl<'a> GameSession<'a> {
    pub fn new(
        state: GameState,
        black: &'a mut Entrant,
        white: &'a mut Entrant,
        scores: &'a ScoreBoard,
        control: &'a RunControl,
    ) -> Self {
        scores.clear();
        Self {
            state,
            black,
            white,
            scores,
            control,
            move_delay: Duration::ZERO,
            moves: 0,
            forced_passes: 0,
            stalled: 0,
        }
    }

    pub fn with_move_delay(mut self, delay: Duration) -> Self {
        self.move_delay = delay;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn control(&self) -> &RunControl {
        self.control
    }

    /// Advance the game by at most one agent turn
    pub fn step(&mut self) -> Step {
        if !self.control.is_running() {
            return self.abandon();
        }
        if self.state.is_game_over() {
            return Step::Finished(self.finish());
        }
        if self.stalled >= STALL_LIMIT {
            warn!(forced_passes = self.stalled, "both agents keep refusing to move, drawing the game");
            return Step::Finished(self.finish());
        }
        if self.control.is_paused() {
            return Step::Wait(PAUSE_POLL);
        }

        let mover = self.state.current_player();
        if self.state.legal_moves().is_empty() {
            debug!(player = ?mover, "no legal moves, pass");
            self.state.pass();
            return Step::Continue;
        }

        let choice = self.ask_agent(mover);

        if !self.control.is_running() {
            return self.abandon();
        }

        match choice {
            Some(mv) if self.state.is_legal(mv) => {
                self.state.play(mv);
                self.moves += 1;
                self.stalled = 0;
                debug!(
                    n = self.moves,
                    agent = %self.name_of(mover),
                    symbol = %mover.symbol(),
                    %mv,
                    black = self.state.pieces(Player::Black),
                    white = self.state.pieces(Player::White),
                    "move"
                );
                if self.move_delay.is_zero() {
                    Step::Continue
                } else {
                    Step::Wait(self.move_delay)
                }
            }
            Some(mv) => {
                warn!(agent = %self.name_of(mover), %mv, "agent returned an illegal move, treating as pass");
                self.forced_pass();
                Step::Continue
            }
            None => {
                warn!(agent = %self.name_of(mover), "agent returned no move despite legal moves, treating as pass");
                self.forced_pass();
                Step::Continue
            }
        }
    }

    // ========================================================================
    // Level 4: Turn helpers
    // ========================================================================

    fn ask_agent(&mut self, mover: Player) -> Option<Move> {
        let scores = self.scores;
        let entrant = match mover {
            Player::Black => &mut *self.black,
            Player::White => &mut *self.white,
        };
        let _collecting = CollectionGuard::open(scores, &entrant.name);
        entrant.agent.select_move(&self.state, scores)
    }

    fn forced_pass(&mut self) {
        self.forced_passes += 1;
        self.stalled += 1;
        self.state.pass();
    }

    fn name_of(&self, player: Player) -> &str {
        match player {
            Player::Black => &self.black.name,
            Player::White => &self.white.name,
        }
    }

    fn abandon(&mut self) -> Step {
        self.scores.clear();
        Step::Abandoned
    }

    fn finish(&mut self) -> GameOutcome {
        self.scores.clear();
        let result = if self.stalled >= STALL_LIMIT {
            GameResult::Draw
        } else {
            self.state.result()
        };
        GameOutcome {
            result,
            black: self.black.name.clone(),
            white: self.white.name.clone(),
            black_pieces: self.state.pieces(Player::Black),
            white_pieces: self.state.pieces(Player::White),
            moves: self.moves,
            forced_passes: self.forced_passes,
        }
    }
}

/// Play a session to completion. `None` when the run was cancelled.
pub fn play_game<S: Scheduler + ?Sized>(
    mut session: GameSession<'_>,
    scheduler: &mut S,
) -> Option<GameOutcome> {
    loop {
        match session.step() {
            Step::Continue => {}
            Step::Wait(duration) => scheduler.suspend(duration, session.control()),
            Step::Finished(outcome) => {
                info!(
                    black = %outcome.black,
                    white = %outcome.white,
                    result = ?outcome.result,
                    moves = outcome.moves,
                    "game over"
                );
                return Some(outcome);
            }
            Step::Abandoned => {
                info!("game abandoned");
                return None;
            }
        }
    }
}

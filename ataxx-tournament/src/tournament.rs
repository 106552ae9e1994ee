//! Tournament execution - double round-robin between two identities
//!
//! Level 1 - Orchestration and Level 2 - Phases

use std::collections::BTreeMap;

use ataxx_core::{GameState, Player, ScoreBoard};
use chrono::Local;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::agents::AgentSpec;
use crate::config::{ConfigError, TournamentConfig};
use crate::control::{RunControl, Scheduler};
use crate::game_runner::{play_game, Entrant, GameOutcome, GameSession};
use crate::maps::{LoadedMap, MapCatalog};
use crate::report::ResultRow;

/// Running totals for one identity
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AgentRecord {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Final piece counts summed over games
    pub total_pieces: u64,
    pub games_played: u32,
}

impl AgentRecord {
    /// Percentage of games won
    pub fn win_rate(&self) -> f64 {
        let decided = self.wins + self.losses + self.draws;
        if decided == 0 {
            0.0
        } else {
            self.wins as f64 / decided as f64 * 100.0
        }
    }

    pub fn avg_pieces(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.total_pieces as f64 / self.games_played as f64
        }
    }
}

/// Bookkeeping inconsistency found after a run
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
pub enum ValidationIssue {
    #[error("expected {expected} total games, but recorded {recorded}")]
    GameCount { expected: u32, recorded: u32 },
    #[error("{agent} results inconsistent - {decided} decided vs {played} played")]
    Inconsistent { agent: String, decided: u32, played: u32 },
}

/// One finished game and where it sat in the schedule
#[derive(Clone, Debug, Serialize)]
pub struct GameRecord {
    /// 1 or 2
    pub round: u8,
    /// 1-based index within the round
    pub game: u32,
    pub outcome: GameOutcome,
}

/// Everything a run produced
#[derive(Clone, Debug, Serialize)]
pub struct TournamentReport {
    pub map_id: String,
    /// Identities in registration order
    pub agents: [String; 2],
    pub results: BTreeMap<String, AgentRecord>,
    pub games: Vec<GameRecord>,
    /// False when the run was cancelled
    pub completed: bool,
    pub issues: Vec<ValidationIssue>,
}

impl TournamentReport {
    pub fn record(&self, agent: &str) -> Option<&AgentRecord> {
        self.results.get(agent)
    }

    pub fn total_recorded(&self) -> u32 {
        self.results.values().map(|r| r.games_played).sum()
    }

    /// Summary rows for every identity that played
    pub fn rows(&self, config: &TournamentConfig) -> Vec<ResultRow> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let [first, second] = &self.agents;

        [(first, second), (second, first)]
            .into_iter()
            .filter_map(|(agent, opponent)| {
                let record = self.results.get(agent.as_str())?;
                (record.games_played > 0).then(|| ResultRow {
                    agent: agent.clone(),
                    opponent: opponent.clone(),
                    wins: record.wins,
                    losses: record.losses,
                    draws: record.draws,
                    total_games: record.games_played,
                    map: self.map_id.clone(),
                    depth: config.depth,
                    iterations: config.iterations,
                    avg_pieces: record.avg_pieces(),
                    timestamp: timestamp.clone(),
                })
            })
            .collect()
    }
}

/// A configured double round-robin between two identities
pub struct Tournament {
    config: TournamentConfig,
    map: LoadedMap,
    entrants: [Entrant; 2],
    scores: ScoreBoard,
    control: RunControl,
}

impl Tournament {
    /// Resolve both identities, load the map and build the agents
    pub fn new(config: TournamentConfig, first: &str, second: &str) -> Result<Self, ConfigError> {
        let first: AgentSpec = first.parse()?;
        let second: AgentSpec = second.parse()?;
        config.validate()?;

        let map = MapCatalog::scan(&config.map_dir).load(config.map_file.as_deref());
        let entrants = [
            Entrant::new(first.name.clone(), first.build(&config, config.seed)),
            Entrant::new(second.name.clone(), second.build(&config, config.seed.wrapping_add(100))),
        ];
        info!(
            first = %first.name,
            first_kind = %first.kind,
            second = %second.name,
            second_kind = %second.kind,
            "resolved agents"
        );

        Self::with_entrants(config, map, entrants)
    }

    /// Use pre-built agents (custom strategies, test stubs)
    pub fn with_entrants(
        config: TournamentConfig,
        map: LoadedMap,
        entrants: [Entrant; 2],
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if entrants[0].name == entrants[1].name {
            return Err(ConfigError::DuplicateAgent(entrants[0].name.clone()));
        }

        info!(
            map = %map.id,
            games_per_match = config.games_per_match,
            first_player = ?config.first_player,
            agents = %format!("{} vs {}", entrants[0].name, entrants[1].name),
            "tournament setup complete"
        );

        Ok(Self {
            config,
            map,
            entrants,
            scores: ScoreBoard::new(),
            control: RunControl::new(),
        })
    }

    /// Share a score store with an observer
    pub fn with_scores(mut self, scores: ScoreBoard) -> Self {
        self.scores = scores;
        self
    }

    /// Share run control with whoever may cancel or pause
    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = control;
        self
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    pub fn map(&self) -> &LoadedMap {
        &self.map
    }

    pub fn scores(&self) -> ScoreBoard {
        self.scores.clone()
    }

    pub fn control(&self) -> RunControl {
        self.control.clone()
    }

    pub fn agent_names(&self) -> [String; 2] {
        [self.entrants[0].name.clone(), self.entrants[1].name.clone()]
    }

    // ========================================================================
    // Level 1 - Orchestration
    // ========================================================================

    pub fn run<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) -> TournamentReport {
        self.run_with(scheduler, |_| {})
    }

    /// Run both rounds, calling `on_game` after every finished game
    pub fn run_with<S, F>(&mut self, scheduler: &mut S, mut on_game: F) -> TournamentReport
    where
        S: Scheduler + ?Sized,
        F: FnMut(&GameRecord),
    {
        self.scores.clear();
        let mut results = self.fresh_results();
        let mut games = Vec::new();

        info!(
            agents = %format!("{} vs {}", self.entrants[0].name, self.entrants[1].name),
            games_each_way = self.config.games_per_match,
            total = self.config.total_games(),
            "starting tournament"
        );

        let mut completed = true;
        for round in [1u8, 2] {
            if !self.play_round(round, scheduler, &mut results, &mut games, &mut on_game) {
                completed = false;
                break;
            }
        }
        self.scores.clear();

        let issues = if completed {
            validate(&results, self.config.games_per_match)
        } else {
            info!(recorded = games.len(), "tournament cancelled");
            Vec::new()
        };
        for issue in &issues {
            warn!("{issue}");
        }

        TournamentReport {
            map_id: self.map.id.clone(),
            agents: self.agent_names(),
            results,
            games,
            completed,
            issues,
        }
    }

    // ========================================================================
    // Level 2 - Phases
    // ========================================================================

    /// Round 1 gives the first identity the colour that moves first; round 2
    /// swaps. Returns false when the run was cancelled.
    fn play_round<S, F>(
        &mut self,
        round: u8,
        scheduler: &mut S,
        results: &mut BTreeMap<String, AgentRecord>,
        games: &mut Vec<GameRecord>,
        on_game: &mut F,
    ) -> bool
    where
        S: Scheduler + ?Sized,
        F: FnMut(&GameRecord),
    {
        let opening = self.config.first_player;
        let [a, b] = &mut self.entrants;
        let (leader, follower) = if round == 1 { (a, b) } else { (b, a) };
        let (black, white) = match opening {
            Player::Black => (leader, follower),
            Player::White => (follower, leader),
        };

        info!(
            round,
            black = %black.name,
            white = %white.name,
            "round start"
        );

        for game in 1..=self.config.games_per_match {
            if !self.control.is_running() {
                return false;
            }
            info!(round, game, of = self.config.games_per_match, "game start");

            let state = GameState::new(self.map.board.clone(), opening);
            let session = GameSession::new(state, &mut *black, &mut *white, &self.scores, &self.control)
                .with_move_delay(self.config.move_delay);

            let Some(outcome) = play_game(session, scheduler) else {
                return false;
            };
            tally(results, &outcome);

            let record = GameRecord { round, game, outcome };
            on_game(&record);
            games.push(record);

            if !self.config.result_pause.is_zero() {
                scheduler.suspend(self.config.result_pause, &self.control);
            }
        }

        self.control.is_running()
    }

    fn fresh_results(&self) -> BTreeMap<String, AgentRecord> {
        self.entrants
            .iter()
            .map(|e| (e.name.clone(), AgentRecord::default()))
            .collect()
    }
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Attribute a finished game by the colour each identity actually played
fn tally(results: &mut BTreeMap<String, AgentRecord>, outcome: &GameOutcome) {
    let winner = outcome.result.winner();
    for player in [Player::Black, Player::White] {
        let record = results.entry(outcome.name_of(player).to_string()).or_default();
        record.games_played += 1;
        record.total_pieces += outcome.pieces_of(player) as u64;
        match winner {
            Some(w) if w == player => record.wins += 1,
            Some(_) => record.losses += 1,
            None => record.draws += 1,
        }
    }
}

/// Cross-check totals after a completed run
pub fn validate(results: &BTreeMap<String, AgentRecord>, games_per_match: u32) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let expected = games_per_match * 2 * results.len() as u32;
    let recorded: u32 = results.values().map(|r| r.games_played).sum();
    if recorded != expected {
        issues.push(ValidationIssue::GameCount { expected, recorded });
    }

    for (agent, record) in results {
        let decided = record.wins + record.losses + record.draws;
        if decided != record.games_played {
            issues.push(ValidationIssue::Inconsistent {
                agent: agent.clone(),
                decided,
                played: record.games_played,
            });
        }
    }

    issues
}

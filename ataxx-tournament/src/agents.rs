//! Agent registry - declarative names to concrete strategies
//!
//! Level 4 - Configuration boundary

use std::fmt;
use std::str::FromStr;

use ataxx_core::{Agent, AlphaBetaAI};
use ataxx_mcts::{MctsConfig, MctsPlayer};
use serde::Serialize;

use crate::config::{ConfigError, TournamentConfig};
use crate::hybrid::HybridAgent;

const HYBRID_MARKER: &str = "AB+MCTS_Domain";
const DOMAIN_MARKER: &str = "MCTS_Domain";

/// Strategy family an identity resolves to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AgentKind {
    /// Alpha-beta minimax
    Tactical,
    /// MCTS with random rollouts
    Sampling,
    /// MCTS with greedy-biased rollouts
    SamplingDomain,
    /// Alpha-beta while the board is open, domain MCTS once it fills up
    HybridDispatch,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AgentKind::Tactical => "alpha-beta",
            AgentKind::Sampling => "MCTS",
            AgentKind::SamplingDomain => "domain MCTS",
            AgentKind::HybridDispatch => "hybrid alpha-beta/MCTS",
        };
        f.write_str(label)
    }
}

/// A parsed agent identity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentSpec {
    /// Identity as written; key of the results table
    pub name: String,
    pub kind: AgentKind,
    /// Iteration budget embedded in the name (`MCTS_Domain_600`)
    pub iterations: Option<u32>,
}

impl FromStr for AgentSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let unknown = || ConfigError::UnknownAgent(name.to_string());

        let kind = if name.starts_with("Minimax") {
            AgentKind::Tactical
        } else if name.contains(HYBRID_MARKER) {
            AgentKind::HybridDispatch
        } else if name.contains(DOMAIN_MARKER) {
            AgentKind::SamplingDomain
        } else if name == "MCTS" || name.starts_with("MCTS_") {
            AgentKind::Sampling
        } else {
            return Err(unknown());
        };

        let iterations = numeric_suffix(name)?;
        // Plain MCTS accepts nothing after the prefix but a budget
        if kind == AgentKind::Sampling && name != "MCTS" && iterations.is_none() {
            return Err(unknown());
        }

        Ok(AgentSpec {
            name: name.to_string(),
            kind,
            iterations,
        })
    }
}

/// Trailing `_<digits>` segment, if any
fn numeric_suffix(name: &str) -> Result<Option<u32>, ConfigError> {
    let Some((_, suffix)) = name.rsplit_once('_') else {
        return Ok(None);
    };
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    match suffix.parse::<u32>() {
        Ok(0) | Err(_) => Err(ConfigError::Invalid(format!(
            "iteration budget in '{}' must be between 1 and {}",
            name,
            u32::MAX
        ))),
        Ok(n) => Ok(Some(n)),
    }
}

impl AgentSpec {
    /// Iteration budget for this identity: embedded suffix or the default
    pub fn iterations_or(&self, default: u32) -> u32 {
        self.iterations.unwrap_or(default)
    }

    /// Instantiate the strategy this identity names
    pub fn build(&self, config: &TournamentConfig, seed: u64) -> Box<dyn Agent> {
        let iterations = self.iterations_or(config.iterations);

        match self.kind {
            AgentKind::Tactical => Box::new(AlphaBetaAI::with_seed(config.depth, seed)),
            AgentKind::Sampling => {
                Box::new(MctsPlayer::with_seed(MctsConfig::baseline(iterations), seed))
            }
            AgentKind::SamplingDomain => Box::new(MctsPlayer::with_seed(
                MctsConfig::domain(iterations).with_tournament(config.use_tournament),
                seed,
            )),
            AgentKind::HybridDispatch => {
                let tactical = AlphaBetaAI::with_seed(config.depth, seed);
                let sampling = MctsPlayer::with_seed(
                    MctsConfig::domain(iterations).with_tournament(config.use_tournament),
                    seed.wrapping_add(1),
                );
                Box::new(HybridAgent::new(
                    &self.name,
                    config.transition_threshold,
                    Box::new(tactical),
                    Box::new(sampling),
                ))
            }
        }
    }
}

//! Ataxx Core - Game engine and AI
//!
//! This crate provides the core game logic:
//! - Board geometry and layout files (7x7 grid with blocked cells)
//! - Game state, move generation and termination rules
//! - Position evaluation
//! - The `Agent` capability and the move score broadcast
//! - CPU-based alpha-beta AI

pub mod board;
pub mod game;
pub mod eval;
pub mod agent;
pub mod scores;
pub mod ai;

// Re-exports for convenient access
pub use board::{Board, BoardError, Cell, Coord, BOARD_SIZE};
pub use game::{GameResult, GameState, Move, Player};
pub use eval::{evaluate, move_gain, piece_share, WIN_VALUE};
pub use agent::{Agent, FirstMoveAgent};
pub use scores::ScoreBoard;
pub use ai::AlphaBetaAI;

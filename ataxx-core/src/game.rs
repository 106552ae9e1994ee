//! Game state and move generation

use crate::board::{Board, Cell, Coord, CELL_COUNT, JUMPS, NEIGHBOURS};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Occurrences of a position that end the game as a draw
const REPETITION_LIMIT: usize = 3;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// Moves as "X", marker +1
    Black,
    /// Moves as "O", marker -1
    White,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Numeric marker: +1 for black, -1 for white
    pub fn sign(self) -> i8 {
        match self {
            Player::Black => 1,
            Player::White => -1,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Player::Black => 'X',
            Player::White => 'O',
        }
    }

    /// Parse a color letter: `B`/`X` for black, `W`/`O` for white
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.trim().to_ascii_uppercase().as_str() {
            "B" | "X" | "BLACK" => Some(Player::Black),
            "W" | "O" | "WHITE" => Some(Player::White),
            _ => None,
        }
    }
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    BlackWins,
    WhiteWins,
    Draw,
}

impl GameResult {
    pub fn winner(self) -> Option<Player> {
        match self {
            GameResult::BlackWins => Some(Player::Black),
            GameResult::WhiteWins => Some(Player::White),
            GameResult::Ongoing | GameResult::Draw => None,
        }
    }

    /// Winner marker: +1, -1, or 0 for a draw
    pub fn winner_sign(self) -> i8 {
        self.winner().map_or(0, Player::sign)
    }
}

/// A move: source cell to destination cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Move {
    pub from: Coord,
    pub to: Coord,
}

impl Move {
    pub const fn new(r: u8, c: u8, nr: u8, nc: u8) -> Self {
        Self {
            from: Coord::new(r, c),
            to: Coord::new(nr, nc),
        }
    }

    /// Adjacent move: the source piece stays and is duplicated
    pub fn is_clone(&self) -> bool {
        self.from.distance_to(self.to) <= 1
    }

    /// Distance-two move: the source piece relocates
    pub fn is_jump(&self) -> bool {
        !self.is_clone()
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_clone() { "clone" } else { "jump" };
        write!(f, "{}->{} ({})", self.from, self.to, kind)
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Full game state: board, side to move and repetition history
#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    current: Player,
    history: Vec<u64>,
}

impl GameState {
    /// Fresh game from a layout with `first` to move
    pub fn new(board: Board, first: Player) -> Self {
        Self {
            board,
            current: first,
            history: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.current
    }

    pub fn empty_cells(&self) -> usize {
        self.board.count(Cell::Empty)
    }

    pub fn blocked_cells(&self) -> usize {
        self.board.count(Cell::Blocked)
    }

    pub fn pieces(&self, player: Player) -> usize {
        self.board.count(Cell::Piece(player))
    }

    // ------------------------------------------------------------------------
    // Move generation
    // ------------------------------------------------------------------------

    /// Legal moves for the side to move.
    ///
    /// Clones come first, then jumps. Each destination appears at most once,
    /// and a destination reachable by a clone is never offered as a jump.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        let mut taken = [false; CELL_COUNT];

        for offsets in [&NEIGHBOURS[..], &JUMPS[..]] {
            for from in self.board.pieces_of(self.current) {
                for &(dr, dc) in offsets {
                    let Some(to) = from.offset(dr, dc) else {
                        continue;
                    };
                    if self.board.get(to) == Cell::Empty && !taken[to.index()] {
                        taken[to.index()] = true;
                        moves.push(Move { from, to });
                    }
                }
            }
        }

        moves
    }

    /// Whether `player` has at least one legal move
    pub fn has_moves(&self, player: Player) -> bool {
        self.board.pieces_of(player).any(|from| {
            NEIGHBOURS
                .iter()
                .chain(JUMPS.iter())
                .filter_map(|&(dr, dc)| from.offset(dr, dc))
                .any(|to| self.board.get(to) == Cell::Empty)
        })
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        self.board.get(mv.from) == Cell::Piece(self.current)
            && self.board.get(mv.to) == Cell::Empty
            && (1..=2).contains(&mv.from.distance_to(mv.to))
    }

    // ------------------------------------------------------------------------
    // Move application
    // ------------------------------------------------------------------------

    /// Play a move in place. The move must be legal.
    pub fn play(&mut self, mv: Move) {
        debug_assert!(self.is_legal(mv), "illegal move {}", mv);

        let hash = self.position_hash();
        self.history.push(hash);

        let me = Cell::Piece(self.current);
        let them = Cell::Piece(self.current.opponent());

        self.board.set(mv.to, me);
        if mv.is_jump() {
            self.board.set(mv.from, Cell::Empty);
        }

        for &(dr, dc) in &NEIGHBOURS {
            if let Some(pos) = mv.to.offset(dr, dc) {
                if self.board.get(pos) == them {
                    self.board.set(pos, me);
                }
            }
        }

        self.current = self.current.opponent();
    }

    /// Return the state after playing `mv`
    pub fn apply_move(&self, mv: Move) -> GameState {
        let mut next = self.clone();
        next.play(mv);
        next
    }

    /// Hand the turn to the opponent without moving
    pub fn pass(&mut self) {
        self.current = self.current.opponent();
    }

    // ------------------------------------------------------------------------
    // Termination
    // ------------------------------------------------------------------------

    fn position_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.board.hash(&mut hasher);
        self.current.hash(&mut hasher);
        hasher.finish()
    }

    /// How many times the current position was seen before
    pub fn repetition_count(&self) -> usize {
        let hash = self.position_hash();
        self.history.iter().filter(|&&h| h == hash).count()
    }

    pub fn is_game_over(&self) -> bool {
        self.empty_cells() == 0
            || self.pieces(Player::Black) == 0
            || self.pieces(Player::White) == 0
            || self.repetition_count() >= REPETITION_LIMIT
            || (!self.has_moves(self.current) && !self.has_moves(self.current.opponent()))
    }

    pub fn result(&self) -> GameResult {
        if !self.is_game_over() {
            return GameResult::Ongoing;
        }
        if self.repetition_count() >= REPETITION_LIMIT {
            return GameResult::Draw;
        }

        let black = self.pieces(Player::Black);
        let white = self.pieces(Player::White);
        match black.cmp(&white) {
            std::cmp::Ordering::Greater => GameResult::BlackWins,
            std::cmp::Ordering::Less => GameResult::WhiteWins,
            std::cmp::Ordering::Equal => GameResult::Draw,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

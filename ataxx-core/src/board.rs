//! Board geometry and layout files

use crate::game::Player;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Board dimension (square)
pub const BOARD_SIZE: usize = 7;

/// Total number of cells
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// The eight neighbour offsets, row-major
pub const NEIGHBOURS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// The sixteen offsets at Chebyshev distance 2, row-major
pub const JUMPS: [(i8, i8); 16] = [
    (-2, -2), (-2, -1), (-2, 0), (-2, 1), (-2, 2),
    (-1, -2),                             (-1, 2),
    (0, -2),                              (0, 2),
    (1, -2),                              (1, 2),
    (2, -2),  (2, -1),  (2, 0),  (2, 1),  (2, 2),
];

// ============================================================================
// COORDINATES
// ============================================================================

/// Cell coordinate (row, column)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Offset this coordinate, returning None when it leaves the board
    pub fn offset(self, dr: i8, dc: i8) -> Option<Coord> {
        let r = self.row as i8 + dr;
        let c = self.col as i8 + dc;
        if (0..BOARD_SIZE as i8).contains(&r) && (0..BOARD_SIZE as i8).contains(&c) {
            Some(Coord::new(r as u8, c as u8))
        } else {
            None
        }
    }

    /// Chebyshev distance
    pub fn distance_to(self, other: Coord) -> u8 {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }

    pub(crate) fn index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

// ============================================================================
// CELLS AND BOARD
// ============================================================================

/// Contents of a single cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Piece(Player),
    Blocked,
}

impl Cell {
    fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Piece(Player::Black) => 'X',
            Cell::Piece(Player::White) => 'O',
            Cell::Blocked => '#',
        }
    }
}

/// Errors raised while reading a board layout
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("layout is empty")]
    Empty,
    #[error("layout has no {0:?} pieces")]
    MissingPieces(Player),
    #[error("failed to read layout: {0}")]
    Io(#[from] std::io::Error),
}

/// 7x7 grid of cells
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Default for Board {
    fn default() -> Self {
        Self::default_layout()
    }
}

impl Board {
    /// Board with every cell empty
    pub fn empty() -> Self {
        Self {
            cells: [Cell::Empty; CELL_COUNT],
        }
    }

    /// Two pieces per side at opposite corners
    pub fn default_layout() -> Self {
        let mut board = Self::empty();
        board.set(Coord::new(0, 0), Cell::Piece(Player::Black));
        board.set(Coord::new(6, 6), Cell::Piece(Player::Black));
        board.set(Coord::new(0, 6), Cell::Piece(Player::White));
        board.set(Coord::new(6, 0), Cell::Piece(Player::White));
        board
    }

    /// Parse a plain-text layout.
    ///
    /// One line per row, one character per column; anything beyond 7x7 is
    /// ignored. `B`/`X` are black pieces, `W`/`O` white pieces, `#` blocked
    /// cells and every other character is empty.
    pub fn parse(text: &str) -> Result<Self, BoardError> {
        let lines: Vec<&str> = text.lines().map(str::trim).take(BOARD_SIZE).collect();
        if lines.iter().all(|l| l.is_empty()) {
            return Err(BoardError::Empty);
        }

        let mut board = Self::empty();
        for (r, line) in lines.iter().enumerate() {
            for (c, ch) in line.chars().take(BOARD_SIZE).enumerate() {
                let cell = match ch {
                    'B' | 'X' => Cell::Piece(Player::Black),
                    'W' | 'O' => Cell::Piece(Player::White),
                    '#' => Cell::Blocked,
                    _ => Cell::Empty,
                };
                board.set(Coord::new(r as u8, c as u8), cell);
            }
        }

        for player in [Player::Black, Player::White] {
            if board.count(Cell::Piece(player)) == 0 {
                return Err(BoardError::MissingPieces(player));
            }
        }

        Ok(board)
    }

    /// Read and parse a layout file
    pub fn load(path: &std::path::Path) -> Result<Self, BoardError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn get(&self, pos: Coord) -> Cell {
        self.cells[pos.index()]
    }

    pub fn set(&mut self, pos: Coord, cell: Cell) {
        self.cells[pos.index()] = cell;
    }

    /// Number of cells holding exactly `cell`
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    /// All coordinates in row-major order
    pub fn coords() -> impl Iterator<Item = Coord> {
        (0..BOARD_SIZE as u8).flat_map(|r| (0..BOARD_SIZE as u8).map(move |c| Coord::new(r, c)))
    }

    /// Coordinates holding a piece of `player`, row-major
    pub fn pieces_of(&self, player: Player) -> impl Iterator<Item = Coord> + '_ {
        Self::coords().filter(move |&pos| self.get(pos) == Cell::Piece(player))
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  ")?;
        for c in 0..BOARD_SIZE {
            write!(f, " {} ", c)?;
        }
        writeln!(f)?;
        for r in 0..BOARD_SIZE {
            write!(f, "{} ", r)?;
            for c in 0..BOARD_SIZE {
                write!(f, " {} ", self.get(Coord::new(r as u8, c as u8)).symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Board\n{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_corners() {
        let board = Board::default_layout();
        assert_eq!(board.get(Coord::new(0, 0)), Cell::Piece(Player::Black));
        assert_eq!(board.get(Coord::new(6, 6)), Cell::Piece(Player::Black));
        assert_eq!(board.get(Coord::new(0, 6)), Cell::Piece(Player::White));
        assert_eq!(board.get(Coord::new(6, 0)), Cell::Piece(Player::White));
        assert_eq!(board.count(Cell::Empty), CELL_COUNT - 4);
    }

    #[test]
    fn test_parse_layout() {
        let text = "B.....W\n...#...\n.......\n..###..\n.......\n...#...\nW.....B\n";
        let board = Board::parse(text).unwrap();
        assert_eq!(board.count(Cell::Blocked), 5);
        assert_eq!(board.count(Cell::Piece(Player::Black)), 2);
        assert_eq!(board.count(Cell::Piece(Player::White)), 2);
        assert_eq!(board.get(Coord::new(3, 3)), Cell::Blocked);
    }

    #[test]
    fn test_parse_truncates_oversized_layout() {
        let text = "B.......W\n\n\n\n\n\n.W\nB.B.B.B\n";
        let board = Board::parse(text).unwrap();
        // Ninth column and eighth row are ignored
        assert_eq!(board.count(Cell::Piece(Player::Black)), 1);
        assert_eq!(board.get(Coord::new(6, 1)), Cell::Piece(Player::White));
    }

    #[test]
    fn test_parse_rejects_empty_and_one_sided() {
        assert!(matches!(Board::parse(""), Err(BoardError::Empty)));
        assert!(matches!(
            Board::parse("B......\n"),
            Err(BoardError::MissingPieces(Player::White))
        ));
    }

    #[test]
    fn test_coord_offset_and_distance() {
        let c = Coord::new(0, 0);
        assert_eq!(c.offset(-1, 0), None);
        assert_eq!(c.offset(2, 1), Some(Coord::new(2, 1)));
        assert_eq!(c.distance_to(Coord::new(2, 1)), 2);
    }
}

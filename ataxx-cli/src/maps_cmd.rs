//! Maps command - list the layouts a tournament can use
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use ataxx_core::{Board, Cell, Player};
use ataxx_tournament::{MapCatalog, DEFAULT_MAP_ID};

#[derive(Args)]
pub struct MapsArgs {
    /// Directory containing *.txt layouts
    #[arg(long, default_value = "map")]
    pub map_dir: PathBuf,

    /// Print each board as well
    #[arg(long)]
    pub show: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: MapsArgs) -> Result<()> {
    let catalog = MapCatalog::scan(&args.map_dir);

    if catalog.files().is_empty() {
        tracing::warn!(dir = %args.map_dir.display(), "no map files found");
    }

    println!("{:<28} {}", DEFAULT_MAP_ID, describe(&Board::default_layout()));
    if args.show {
        println!("{}", Board::default_layout());
    }

    for index in 0..catalog.files().len() {
        let id = catalog.map_id(index).unwrap_or_default();
        match catalog.read(index) {
            Some(Ok(board)) => {
                println!("{:<28} {}", id, describe(&board));
                if args.show {
                    println!("{board}");
                }
            }
            Some(Err(e)) => println!("{:<28} invalid: {}", id, e),
            None => {}
        }
    }

    Ok(())
}

// ============================================================================
// LEVEL 4 - FORMATTING
// ============================================================================

fn describe(board: &Board) -> String {
    format!(
        "X={} O={} blocked={} empty={}",
        board.count(Cell::Piece(Player::Black)),
        board.count(Cell::Piece(Player::White)),
        board.count(Cell::Blocked),
        board.count(Cell::Empty),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_default_layout() {
        assert_eq!(
            describe(&Board::default_layout()),
            "X=2 O=2 blocked=0 empty=45"
        );
    }
}

//! Map catalogue - layout files under a directory
//!
//! Level 4 - Utilities

use std::path::{Path, PathBuf};

use ataxx_core::{Board, BoardError};
use tracing::{debug, info, warn};

/// Identifier persisted for the built-in layout
pub const DEFAULT_MAP_ID: &str = "Default";

/// A layout ready to play, with the identifier results are stored under
#[derive(Clone, Debug)]
pub struct LoadedMap {
    pub id: String,
    pub board: Board,
}

impl LoadedMap {
    pub fn default_layout() -> Self {
        Self {
            id: DEFAULT_MAP_ID.to_string(),
            board: Board::default_layout(),
        }
    }

    pub fn new(id: impl Into<String>, board: Board) -> Self {
        Self {
            id: id.into(),
            board,
        }
    }
}

/// Sorted `*.txt` files of a map directory
#[derive(Clone, Debug)]
pub struct MapCatalog {
    dir: PathBuf,
    files: Vec<String>,
}

impl MapCatalog {
    /// List a directory; a missing or unreadable directory is an empty catalogue
    pub fn scan(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let mut files: Vec<String> = match std::fs::read_dir(&dir) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .filter_map(|entry| entry.file_name().into_string().ok())
                .filter(|name| name.ends_with(".txt"))
                .collect(),
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "map directory not readable");
                Vec::new()
            }
        };
        files.sort();
        Self { dir, files }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Position of a file in the catalogue; `.txt` may be omitted
    pub fn index_of(&self, file: &str) -> Option<usize> {
        let wanted = if file.ends_with(".txt") {
            file.to_string()
        } else {
            format!("{file}.txt")
        };
        self.files.iter().position(|f| *f == wanted)
    }

    /// `Map_<index>_<stem>`
    pub fn map_id(&self, index: usize) -> Option<String> {
        self.files
            .get(index)
            .map(|f| format!("Map_{}_{}", index, f.trim_end_matches(".txt")))
    }

    /// Parse a catalogued file
    pub fn read(&self, index: usize) -> Option<Result<Board, BoardError>> {
        self.files.get(index).map(|f| Board::load(&self.dir.join(f)))
    }

    /// Load `file`, falling back to the default layout with a warning
    pub fn load(&self, file: Option<&str>) -> LoadedMap {
        let Some(file) = file else {
            info!("using default map");
            return LoadedMap::default_layout();
        };

        let Some(index) = self.index_of(file) else {
            warn!(file, dir = %self.dir.display(), "map file not found, using default map");
            return LoadedMap::default_layout();
        };

        match self.read(index) {
            Some(Ok(board)) => {
                let id = self.map_id(index).unwrap_or_else(|| DEFAULT_MAP_ID.to_string());
                info!(map = %id, "loaded map");
                LoadedMap::new(id, board)
            }
            Some(Err(e)) => {
                warn!(file, error = %e, "error reading map file, using default map");
                LoadedMap::default_layout()
            }
            None => LoadedMap::default_layout(),
        }
    }
}

//! Result persistence - append-only CSV store
//!
//! Level 2 - Reporting phase

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

pub const CSV_HEADER: &str =
    "Agent,Opponent,Wins,Losses,Draws,TotalGames,Map,Depth,Iterations,AvgPieces,Timestamp";

/// One identity's line for one completed tournament
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultRow {
    pub agent: String,
    pub opponent: String,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub total_games: u32,
    pub map: String,
    pub depth: u32,
    pub iterations: u32,
    pub avg_pieces: f64,
    pub timestamp: String,
}

impl ResultRow {
    /// Percentage of games won
    pub fn win_rate(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            self.wins as f64 / self.total_games as f64 * 100.0
        }
    }

    fn to_csv(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{:.2},{}",
            csv_field(&self.agent),
            csv_field(&self.opponent),
            self.wins,
            self.losses,
            self.draws,
            self.total_games,
            csv_field(&self.map),
            self.depth,
            self.iterations,
            self.avg_pieces,
            csv_field(&self.timestamp),
        )
    }

    /// `Agent: 3W-1L-0D (75.0% win rate, 21.50 avg pieces)`
    pub fn summary_line(&self) -> String {
        format!(
            "{}: {}W-{}L-{}D ({:.1}% win rate, {:.2} avg pieces)",
            self.agent,
            self.wins,
            self.losses,
            self.draws,
            self.win_rate(),
            self.avg_pieces
        )
    }
}

/// Quote a field only when it would break the row
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Split a line written by `to_csv`, honouring quoted fields
fn split_csv(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            ('"', _) => quoted = !quoted,
            (',', false) => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Aggregate of every stored row for one agent
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub agent: String,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub total_games: u32,
    /// Mean of the per-tournament averages
    pub avg_pieces: f64,
    pub tournaments: u32,
}

impl HistoryEntry {
    pub fn win_rate(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            self.wins as f64 / self.total_games as f64 * 100.0
        }
    }
}

/// Append-only results file
#[derive(Clone, Debug)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append rows, writing the header first if the file is new or empty.
    /// A file with a different header is left untouched.
    pub fn append(&self, rows: &[ResultRow]) -> io::Result<()> {
        let needs_header = match self.header()? {
            None => true,
            Some(header) if header == CSV_HEADER => false,
            Some(header) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("existing results file has a different header: {header}"),
                ))
            }
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if needs_header {
            writeln!(file, "{CSV_HEADER}")?;
        }
        for row in rows {
            writeln!(file, "{}", row.to_csv())?;
        }
        file.flush()
    }

    /// First line of the store, `None` if the file is missing or empty
    fn header(&self) -> io::Result<Option<String>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let mut line = String::new();
        BufReader::new(file).read_line(&mut line)?;
        let line = line.trim_end();
        Ok((!line.is_empty()).then(|| line.to_string()))
    }

    /// Append, or print the rows if the store cannot be written.
    /// Returns whether the rows were persisted.
    pub fn append_or_print(&self, rows: &[ResultRow]) -> bool {
        match self.append(rows) {
            Ok(()) => {
                info!(path = %self.path.display(), rows = rows.len(), "saved results");
                true
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not save results, printing instead");
                println!("{CSV_HEADER}");
                for row in rows {
                    println!("{}", row.to_csv());
                }
                false
            }
        }
    }

    /// Per-agent totals over every stored row, skipping malformed lines
    pub fn history(&self) -> io::Result<Vec<HistoryEntry>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut by_agent: BTreeMap<String, HistoryEntry> = BTreeMap::new();
        let mut piece_sums: BTreeMap<String, f64> = BTreeMap::new();

        for line in content.lines().skip(1).filter(|l| !l.trim().is_empty()) {
            let Some(row) = parse_row(line) else {
                warn!(line, "skipping malformed results line");
                continue;
            };
            let entry = by_agent.entry(row.agent.clone()).or_insert_with(|| HistoryEntry {
                agent: row.agent.clone(),
                ..Default::default()
            });
            entry.wins += row.wins;
            entry.losses += row.losses;
            entry.draws += row.draws;
            entry.total_games += row.total_games;
            entry.tournaments += 1;
            *piece_sums.entry(row.agent).or_default() += row.avg_pieces;
        }

        Ok(by_agent
            .into_values()
            .map(|mut entry| {
                let sum = piece_sums.get(&entry.agent).copied().unwrap_or(0.0);
                entry.avg_pieces = sum / entry.tournaments.max(1) as f64;
                entry
            })
            .collect())
    }
}

fn parse_row(line: &str) -> Option<ResultRow> {
    let fields = split_csv(line);
    if fields.len() < 10 {
        return None;
    }
    Some(ResultRow {
        agent: fields[0].clone(),
        opponent: fields[1].clone(),
        wins: fields[2].trim().parse().ok()?,
        losses: fields[3].trim().parse().ok()?,
        draws: fields[4].trim().parse().ok()?,
        total_games: fields[5].trim().parse().ok()?,
        map: fields[6].clone(),
        depth: fields[7].trim().parse().ok()?,
        iterations: fields[8].trim().parse().ok()?,
        avg_pieces: fields[9].trim().parse().ok()?,
        timestamp: fields.get(10).cloned().unwrap_or_default(),
    })
}

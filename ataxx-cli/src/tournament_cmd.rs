//! Tournament command - double round-robin between two agents
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), play(), report_results()
//! - Level 3: watch_scores(), toggle_pause_on(), progress helpers
//! - Level 4: argument parsing utilities

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use ataxx_core::{Player, ScoreBoard};
use ataxx_tournament::{
    ResultRow, ResultStore, RunControl, ThreadScheduler, Tournament, TournamentConfig,
    TournamentReport, ValidationIssue,
};

/// Interval between live score log lines
const WATCH_INTERVAL: Duration = Duration::from_millis(500);

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args, Debug)]
pub struct TournamentArgs {
    /// Layout file inside --map-dir (default layout when omitted)
    #[arg(long)]
    pub map_file: Option<String>,

    /// Directory containing *.txt layouts
    #[arg(long, default_value = "map")]
    pub map_dir: PathBuf,

    /// Games per round; colours swap for a second round of the same size
    #[arg(long, default_value = "5")]
    pub games: u32,

    /// Default MCTS iterations (a `_<n>` suffix on an agent name overrides it)
    #[arg(long, default_value = "300")]
    pub iterations: u32,

    /// First agent: Minimax, MCTS[_<n>], MCTS_Domain[_<n>] or AB+MCTS_Domain[_<n>]
    #[arg(long, default_value = "MCTS_Domain_600")]
    pub algo1: String,

    /// Second agent
    #[arg(long, default_value = "Minimax+AB")]
    pub algo2: String,

    /// Seconds to wait after each move
    #[arg(long, default_value = "0")]
    pub delay: f64,

    /// Seconds to wait after each game
    #[arg(long, default_value = "0")]
    pub result_pause: f64,

    /// Colour that moves first: B (X) or W (O)
    #[arg(long, default_value = "W", value_parser = parse_player)]
    pub first_player: Player,

    /// Tournament-style root selection for MCTS agents
    #[arg(long)]
    pub use_tournament: bool,

    /// Hybrid agents use alpha-beta above this many empty cells, MCTS at or below
    #[arg(long, default_value = "13")]
    pub transition_threshold: usize,

    /// Alpha-beta search depth
    #[arg(long, default_value = "4")]
    pub depth: u32,

    /// Base random seed
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// CSV file results are appended to
    #[arg(long, default_value = "results.csv")]
    pub results: PathBuf,

    /// Do not write the results file
    #[arg(long)]
    pub no_save: bool,

    /// Log the best-scored destination while agents think
    #[arg(long)]
    pub watch: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run tournament command
///
/// 1. Build configuration and resolve agents
/// 2. Play (blocking thread, Ctrl-C cancels)
/// 3. Report, then persist if the run completed
pub fn run(args: TournamentArgs) -> Result<()> {
    let config = build_config(&args)?;
    let tournament = Tournament::new(config.clone(), &args.algo1, &args.algo2)
        .context("Invalid tournament setup")?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    let report = runtime.block_on(play(tournament, args.watch))?;

    report_results(&report, &config, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_config(args: &TournamentArgs) -> Result<TournamentConfig> {
    let config = TournamentConfig::new(args.games)
        .with_depth(args.depth)
        .with_iterations(args.iterations)
        .with_threshold(args.transition_threshold)
        .with_first_player(args.first_player)
        .with_delays(seconds(args.delay, "--delay")?, seconds(args.result_pause, "--result-pause")?)
        .with_tournament_selection(args.use_tournament)
        .with_seed(args.seed)
        .with_map(args.map_dir.clone(), args.map_file.clone())
        .with_results_path(args.results.clone());

    config.validate()?;
    Ok(config)
}

/// Play on a blocking thread while signal handling and the watcher stay async.
/// Ctrl-C stops the run; on Unix, SIGUSR1 pauses or resumes it.
async fn play(mut tournament: Tournament, watch: bool) -> Result<TournamentReport> {
    let control = tournament.control();
    let progress = progress_bar(tournament.config().total_games());

    let stopper = control.clone();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping tournament");
            stopper.stop();
        }
    });

    #[cfg(unix)]
    let pauser = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::user_defined1()) {
        Ok(signals) => Some(tokio::spawn(toggle_pause_on(signals, control.clone()))),
        Err(e) => {
            tracing::debug!(error = %e, "pause signal unavailable");
            None
        }
    };
    #[cfg(not(unix))]
    let pauser: Option<tokio::task::JoinHandle<()>> = None;

    let watcher = watch.then(|| tokio::spawn(watch_scores(tournament.scores(), control.clone())));

    let bar = progress.clone();
    let report = tokio::task::spawn_blocking(move || {
        tournament.run_with(&mut ThreadScheduler, |record| {
            let winner = record.outcome.winner_name().unwrap_or("draw");
            bar.set_message(format!("round {} game {}: {}", record.round, record.game, winner));
            bar.inc(1);
        })
    })
    .await
    .context("Tournament thread failed")?;

    progress.finish_and_clear();
    signal.abort();
    for task in [pauser, watcher].into_iter().flatten() {
        task.abort();
    }

    Ok(report)
}

fn report_results(report: &TournamentReport, config: &TournamentConfig, args: &TournamentArgs) -> Result<()> {
    let rows = report.rows(config);

    if args.json {
        print_json_results(report, &rows)?;
    } else {
        print_summary(report, &rows);
    }

    if !report.completed {
        tracing::warn!("Tournament cancelled; partial results were not saved");
        return Ok(());
    }
    if args.no_save {
        return Ok(());
    }

    let store = ResultStore::new(&config.results_path);
    if store.append_or_print(&rows) && !args.json {
        print_history(&store);
    }

    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Log the top destination whenever it changes
async fn watch_scores(scores: ScoreBoard, control: RunControl) {
    let mut ticker = tokio::time::interval(WATCH_INTERVAL);
    let mut last = None;

    while control.is_running() {
        ticker.tick().await;
        let top = scores.top_destination();
        if top != last {
            if let Some((cell, score)) = top {
                tracing::info!(agent = %scores.current_agent(), best = %cell, score, "scores");
            }
            last = top;
        }
    }
}

/// Flip the paused flag on every delivery of `signals`
#[cfg(unix)]
async fn toggle_pause_on(mut signals: tokio::signal::unix::Signal, control: RunControl) {
    while signals.recv().await.is_some() {
        let paused = control.toggle_pause();
        tracing::info!(paused, "pause toggled");
    }
}

fn progress_bar(total: u32) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} games {msg}") {
        bar.set_style(style);
    }
    bar
}

fn print_summary(report: &TournamentReport, rows: &[ResultRow]) {
    let [first, second] = &report.agents;
    println!();
    if report.completed {
        println!("Tournament Results ({} vs {}) on {}:", first, second, report.map_id);
    } else {
        println!("Partial Results ({} vs {}) on {}:", first, second, report.map_id);
    }
    for row in rows {
        println!("  {}", row.summary_line());
    }
}

fn print_history(store: &ResultStore) {
    match store.history() {
        Ok(history) if !history.is_empty() => {
            println!();
            println!("Historical Summary (All Matches):");
            for entry in history {
                println!(
                    "  {}: {}W-{}L-{}D ({:.1}% win rate, {:.2} avg pieces, {} total games)",
                    entry.agent,
                    entry.wins,
                    entry.losses,
                    entry.draws,
                    entry.win_rate(),
                    entry.avg_pieces,
                    entry.total_games
                );
            }
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Could not read results history"),
    }
}

/// Print JSON results to stdout
fn print_json_results(report: &TournamentReport, rows: &[ResultRow]) -> Result<()> {
    #[derive(Serialize)]
    struct JsonOutput<'a> {
        map: &'a str,
        completed: bool,
        results: &'a [ResultRow],
        issues: &'a [ValidationIssue],
        games: usize,
    }

    let output = JsonOutput {
        map: &report.map_id,
        completed: report.completed,
        results: rows,
        issues: &report.issues,
        games: report.games.len(),
    };

    let json = serde_json::to_string_pretty(&output)?;
    println!("{}", json);

    Ok(())
}

// ============================================================================
// LEVEL 4 - ARGUMENT PARSING
// ============================================================================

fn parse_player(value: &str) -> Result<Player, String> {
    Player::from_letter(value).ok_or_else(|| format!("expected B or W, got '{value}'"))
}

fn seconds(value: f64, flag: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(value).with_context(|| format!("{flag} must be a non-negative number of seconds"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: TournamentArgs,
    }

    fn parse(extra: &[&str]) -> TournamentArgs {
        let mut argv = vec!["ataxx"];
        argv.extend_from_slice(extra);
        Harness::parse_from(argv).args
    }

    #[test]
    fn test_defaults_match_config() {
        let args = parse(&[]);
        let config = build_config(&args).unwrap();
        assert_eq!(args.algo1, "MCTS_Domain_600");
        assert_eq!(args.algo2, "Minimax+AB");
        assert_eq!(config.first_player, Player::White);
        assert_eq!(config.games_per_match, 5);
        assert_eq!(config.transition_threshold, 13);
        assert_eq!(config.move_delay, Duration::ZERO);
    }

    #[test]
    fn test_flags_map_onto_config() {
        let args = parse(&[
            "--games", "2", "--depth", "3", "--first-player", "B", "--delay", "0.25",
            "--use-tournament", "--map-file", "cross.txt",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.games_per_match, 2);
        assert_eq!(config.depth, 3);
        assert_eq!(config.first_player, Player::Black);
        assert_eq!(config.move_delay, Duration::from_millis(250));
        assert!(config.use_tournament);
        assert_eq!(config.map_file.as_deref(), Some("cross.txt"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_usr1_toggles_pause() {
        use tokio::signal::unix::{signal, SignalKind};

        let control = RunControl::new();
        let signals = signal(SignalKind::user_defined1()).unwrap();
        let task = tokio::spawn(toggle_pause_on(signals, control.clone()));

        let status = std::process::Command::new("kill")
            .args(["-USR1", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), async {
            while !control.is_paused() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        task.abort();
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(build_config(&parse(&["--games", "0"])).is_err());
        assert!(build_config(&parse(&["--delay=-1"])).is_err());
        assert!(Harness::try_parse_from(["ataxx", "--first-player", "green"]).is_err());
    }
}

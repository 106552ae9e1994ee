//! Run control and cooperative suspension
//!
//! `RunControl` carries the process-wide running/paused flags; a
//! `Scheduler` turns the game loop's requested waits into actual pauses.
//! Neither depends on an async runtime: the CLI flips the flags from a
//! signal task while the tournament runs on a blocking thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest uninterrupted sleep; bounds how late a stop is noticed
pub const SUSPEND_SLICE: Duration = Duration::from_millis(50);

/// Cloneable running/paused flags shared with whoever drives the run
#[derive(Clone, Debug)]
pub struct RunControl {
    running: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
}

impl Default for RunControl {
    fn default() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            paused: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Cancel the run; in-flight games are abandoned
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Flip the paused flag, returning the new state
    pub fn toggle_pause(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::SeqCst)
    }
}

/// Timed suspension that gives up early once the run stops
pub trait Scheduler {
    fn suspend(&mut self, duration: Duration, control: &RunControl);
}

/// Blocks the current thread in short slices
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn suspend(&mut self, duration: Duration, control: &RunControl) {
        let deadline = Instant::now() + duration;
        while control.is_running() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep((deadline - now).min(SUSPEND_SLICE));
        }
    }
}

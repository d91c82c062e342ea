//! A small stopwatch for reporting how long encoding phases take.
//!
//! Wraps `start`/`stop` around a phase and logs its duration through
//! `tracing`, matching the rest of this crate's logging.

use std::time::Instant;

pub struct Stopwatch {
    label: &'static str,
    started: Instant,
}

impl Stopwatch {
    /// Start timing a phase, logging its label immediately.
    pub fn start(label: &'static str) -> Self {
        tracing::info!(label, "starting");
        Self {
            label,
            started: Instant::now(),
        }
    }

    /// Stop timing and log the elapsed duration.
    pub fn stop(self) {
        tracing::info!(label = self.label, elapsed = ?self.started.elapsed(), "finished");
    }
}

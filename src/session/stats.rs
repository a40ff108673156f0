use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::stream::RunOutcome;

/// Statistics about a streaming session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// When the connection was accepted
    pub started_at: DateTime<Utc>,

    /// Connection lifetime in seconds
    pub duration_secs: f64,

    /// Runs started on this connection
    pub runs_started: usize,

    /// Runs that sent every fragment
    pub runs_completed: usize,

    /// Runs ended by a stop request or disconnect
    pub runs_stopped: usize,

    /// Runs ended by a source failure
    pub runs_errored: usize,

    /// Fragments sent across all runs
    pub fragments_sent: usize,
}

/// Live counters behind [`SessionStats`], shared with run tasks
#[derive(Debug)]
pub struct SessionCounters {
    started_at: DateTime<Utc>,
    runs_started: AtomicUsize,
    runs_completed: AtomicUsize,
    runs_stopped: AtomicUsize,
    runs_errored: AtomicUsize,
    fragments_sent: AtomicUsize,
}

impl SessionCounters {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            runs_started: AtomicUsize::new(0),
            runs_completed: AtomicUsize::new(0),
            runs_stopped: AtomicUsize::new(0),
            runs_errored: AtomicUsize::new(0),
            fragments_sent: AtomicUsize::new(0),
        }
    }

    pub fn run_started(&self) {
        self.runs_started.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record(&self, outcome: &RunOutcome) {
        match outcome {
            RunOutcome::Completed { total } => {
                self.runs_completed.fetch_add(1, Ordering::SeqCst);
                self.fragments_sent.fetch_add(*total, Ordering::SeqCst);
            }
            RunOutcome::Stopped { sent } | RunOutcome::Disconnected { sent } => {
                self.runs_stopped.fetch_add(1, Ordering::SeqCst);
                self.fragments_sent.fetch_add(*sent, Ordering::SeqCst);
            }
            RunOutcome::Errored(_) => {
                self.runs_errored.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    pub fn snapshot(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.started_at);

        SessionStats {
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            runs_started: self.runs_started.load(Ordering::SeqCst),
            runs_completed: self.runs_completed.load(Ordering::SeqCst),
            runs_stopped: self.runs_stopped.load(Ordering::SeqCst),
            runs_errored: self.runs_errored.load(Ordering::SeqCst),
            fragments_sent: self.fragments_sent.load(Ordering::SeqCst),
        }
    }
}

impl Default for SessionCounters {
    fn default() -> Self {
        Self::new()
    }
}

//! Timer entity for a single tracked job

use std::time::Instant;

/// Identifier assigned by the registry at creation, stable for the
/// timer's whole lifecycle.
pub type TimerId = u64;

/// One tracked job: a name, a job number, and an elapsed-time counter.
///
/// `accumulated_ms` is the durable checkpoint: time accrued across all
/// finished runs. The current run, if any, is represented by `activation`
/// and only folded into the checkpoint when the run ends.
#[derive(Debug, Clone)]
pub struct Timer {
    pub id: TimerId,
    pub name: String,
    pub job_number: String,
    pub accumulated_ms: u64,
    pub archived: bool,
    /// Clock reading at which the current run began; `Some` iff running.
    activation: Option<Instant>,
}

impl Timer {
    /// Create an inactive, unarchived timer.
    pub fn new(id: TimerId, name: String, job_number: String, accumulated_ms: u64) -> Self {
        Self {
            id,
            name,
            job_number,
            accumulated_ms,
            archived: false,
            activation: None,
        }
    }

    /// Check if the timer is currently running.
    pub fn is_active(&self) -> bool {
        self.activation.is_some()
    }

    /// Total elapsed time at `now`: the checkpoint plus the current run.
    ///
    /// A clock reading earlier than the activation instant contributes a
    /// delta of 0, never a negative one.
    pub fn elapsed_ms(&self, now: Instant) -> u64 {
        match self.activation {
            Some(anchor) => self
                .accumulated_ms
                .saturating_add(now.saturating_duration_since(anchor).as_millis() as u64),
            None => self.accumulated_ms,
        }
    }

    /// Begin a run at `now`. Restarts the anchor if already running.
    pub fn activate(&mut self, now: Instant) {
        self.activation = Some(now);
    }

    /// Fold the current run into the checkpoint and clear the activation
    /// marker. No-op when the timer is not running.
    pub fn fold(&mut self, now: Instant) {
        self.accumulated_ms = self.elapsed_ms(now);
        self.activation = None;
    }

    /// Move the activation anchor to `now`, keeping the run going.
    /// Used when the checkpoint is rewritten underneath a running timer.
    pub fn rebase(&mut self, now: Instant) {
        if self.activation.is_some() {
            self.activation = Some(now);
        }
    }

    /// Drop all tracked time and stop any run.
    pub fn reset(&mut self) {
        self.accumulated_ms = 0;
        self.activation = None;
    }
}

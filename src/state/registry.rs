//! Timer registry - owns the timer collection and all cross-timer rules

use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::timer::{Timer, TimerId};

/// Failures surfaced to the caller. Every failure leaves the registry
/// in its prior state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no timer with id {0}")]
    NotFound(TimerId),
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
}

/// Which slice of the collection a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerFilter {
    Active,
    Archived,
}

impl Default for TimerFilter {
    fn default() -> Self {
        TimerFilter::Active
    }
}

/// Serializable read-model of one timer at a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub id: TimerId,
    pub name: String,
    pub job_number: String,
    pub elapsed_ms: u64,
    pub is_active: bool,
    pub is_archived: bool,
}

/// Ordered collection of timers. The registry is the only code allowed to
/// flip activation across more than one timer at once, which is what keeps
/// the at-most-one-running rule airtight.
#[derive(Debug)]
pub struct TimerRegistry {
    timers: Vec<Timer>,
    next_id: TimerId,
}

impl TimerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 1,
        }
    }

    /// Create a registry pre-populated with `count` starter jobs
    /// ("Job 1"/"J1000" onwards), all idle.
    pub fn with_seed(count: u64) -> Self {
        let mut registry = Self::new();
        for i in 0..count {
            let timer = Timer::new(
                registry.take_id(),
                format!("Job {}", i + 1),
                format!("J{}", 1000 + i),
                0,
            );
            registry.timers.push(timer);
        }
        registry
    }

    fn take_id(&mut self) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn find_mut(&mut self, id: TimerId) -> Result<&mut Timer, RegistryError> {
        self.timers
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(RegistryError::NotFound(id))
    }

    fn validate(name: &str, job_number: &str) -> Result<(String, String), RegistryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::EmptyField { field: "name" });
        }
        let job_number = job_number.trim();
        if job_number.is_empty() {
            return Err(RegistryError::EmptyField { field: "job number" });
        }
        Ok((name.to_string(), job_number.to_string()))
    }

    fn assert_exclusive(&self) {
        debug_assert!(
            self.timers.iter().filter(|t| t.is_active()).count() <= 1,
            "more than one timer running"
        );
    }

    /// Number of timers, archived included.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Check if the registry holds no timers at all.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Id of the currently running timer, if any.
    pub fn active_id(&self) -> Option<TimerId> {
        self.timers.iter().find(|t| t.is_active()).map(|t| t.id)
    }

    /// Create a new timer with a fresh id, idle and unarchived.
    /// Both text fields must be non-empty after trimming.
    pub fn add(
        &mut self,
        name: &str,
        job_number: &str,
        initial_ms: u64,
    ) -> Result<TimerId, RegistryError> {
        let (name, job_number) = Self::validate(name, job_number)?;
        let id = self.take_id();
        self.timers.push(Timer::new(id, name, job_number, initial_ms));
        self.assert_exclusive();
        Ok(id)
    }

    /// Start or stop the target timer.
    ///
    /// Stopping folds the run into the checkpoint. Starting first folds
    /// every other running timer, so at most one timer is ever running and
    /// no partial state is observable between the two steps. Returns
    /// whether the target ended up running.
    pub fn toggle(&mut self, id: TimerId, now: Instant) -> Result<bool, RegistryError> {
        let was_active = self
            .timers
            .iter()
            .find(|t| t.id == id)
            .map(Timer::is_active)
            .ok_or(RegistryError::NotFound(id))?;

        if was_active {
            self.find_mut(id)?.fold(now);
        } else {
            for timer in self.timers.iter_mut().filter(|t| t.is_active()) {
                timer.fold(now);
            }
            self.find_mut(id)?.activate(now);
        }

        self.assert_exclusive();
        Ok(!was_active)
    }

    /// Overwrite a timer's name, job number and checkpoint.
    ///
    /// A running timer keeps running: the new checkpoint replaces the old
    /// one and the run's delta restarts from the edit instant, so the
    /// displayed time continues from the edited value.
    pub fn edit(
        &mut self,
        id: TimerId,
        name: &str,
        job_number: &str,
        accumulated_ms: u64,
        now: Instant,
    ) -> Result<(), RegistryError> {
        let (name, job_number) = Self::validate(name, job_number)?;
        let timer = self.find_mut(id)?;
        timer.name = name;
        timer.job_number = job_number;
        timer.accumulated_ms = accumulated_ms;
        timer.rebase(now);
        Ok(())
    }

    /// Soft-remove a timer from the active view. A running timer is folded
    /// and stopped first, so no in-progress time is lost.
    pub fn archive(&mut self, id: TimerId, now: Instant) -> Result<(), RegistryError> {
        let timer = self.find_mut(id)?;
        timer.fold(now);
        timer.archived = true;
        self.assert_exclusive();
        Ok(())
    }

    /// Bring an archived timer back into the active view, idle.
    pub fn restore(&mut self, id: TimerId) -> Result<(), RegistryError> {
        let timer = self.find_mut(id)?;
        timer.archived = false;
        Ok(())
    }

    /// Zero every non-archived timer and stop all runs. Archived timers
    /// keep their tracked time. Irreversible; the caller is responsible
    /// for confirming with the user first.
    pub fn clear_all(&mut self) {
        for timer in self.timers.iter_mut().filter(|t| !t.archived) {
            timer.reset();
        }
        self.assert_exclusive();
    }

    /// Read-model of every timer at `now`, in creation order.
    pub fn snapshot(&self, now: Instant) -> Vec<TimerSnapshot> {
        self.timers.iter().map(|t| view(t, now)).collect()
    }

    /// Read-model of one slice of the collection at `now`, in creation
    /// order. `Active` returns the non-archived timers.
    pub fn list(&self, filter: TimerFilter, now: Instant) -> Vec<TimerSnapshot> {
        self.timers
            .iter()
            .filter(|t| match filter {
                TimerFilter::Active => !t.archived,
                TimerFilter::Archived => t.archived,
            })
            .map(|t| view(t, now))
            .collect()
    }
}

fn view(timer: &Timer, now: Instant) -> TimerSnapshot {
    TimerSnapshot {
        id: timer.id,
        name: timer.name.clone(),
        job_number: timer.job_number.clone(),
        elapsed_ms: timer.elapsed_ms(now),
        is_active: timer.is_active(),
        is_archived: timer.archived,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    fn elapsed_of(registry: &TimerRegistry, id: TimerId, now: Instant) -> u64 {
        registry
            .snapshot(now)
            .into_iter()
            .find(|s| s.id == id)
            .map(|s| s.elapsed_ms)
            .unwrap()
    }

    #[test]
    fn test_seeded_registry_defaults() {
        let base = Instant::now();
        let registry = TimerRegistry::with_seed(5);

        let snaps = registry.snapshot(base);
        assert_eq!(snaps.len(), 5);
        assert_eq!(snaps[0].name, "Job 1");
        assert_eq!(snaps[0].job_number, "J1000");
        assert_eq!(snaps[4].name, "Job 5");
        assert_eq!(snaps[4].job_number, "J1004");
        assert!(snaps.iter().all(|s| s.elapsed_ms == 0));
        assert!(snaps.iter().all(|s| !s.is_active && !s.is_archived));
    }

    #[test]
    fn test_single_run_accrual_and_stop() {
        // Scenario: toggle on at t=0, read at t=5000, toggle off at t=5000
        let base = Instant::now();
        let mut registry = TimerRegistry::with_seed(1);

        assert!(registry.toggle(1, base).unwrap());
        assert_eq!(elapsed_of(&registry, 1, at(base, 5_000)), 5_000);

        assert!(!registry.toggle(1, at(base, 5_000)).unwrap());
        let snap = &registry.snapshot(at(base, 5_000))[0];
        assert!(!snap.is_active);
        assert_eq!(snap.elapsed_ms, 5_000);
    }

    #[test]
    fn test_toggle_conservation_at_transition() {
        let base = Instant::now();
        let mut registry = TimerRegistry::with_seed(1);

        registry.toggle(1, base).unwrap();
        let before = elapsed_of(&registry, 1, at(base, 4_200));
        registry.toggle(1, at(base, 4_200)).unwrap();
        let after = elapsed_of(&registry, 1, at(base, 4_200));

        assert_eq!(before, after);
    }

    #[test]
    fn test_starting_one_timer_stops_the_other() {
        // Scenario: T1 runs from t=0, T2 toggled at t=3000
        let base = Instant::now();
        let mut registry = TimerRegistry::with_seed(2);

        registry.toggle(1, base).unwrap();
        registry.toggle(2, at(base, 3_000)).unwrap();

        assert_eq!(registry.active_id(), Some(2));
        let snaps = registry.snapshot(at(base, 3_000));
        assert!(!snaps[0].is_active);
        assert_eq!(snaps[0].elapsed_ms, 3_000);
        assert!(snaps[1].is_active);
        assert_eq!(snaps[1].elapsed_ms, 0);

        // T2 keeps accruing from its own activation instant
        assert_eq!(elapsed_of(&registry, 2, at(base, 7_000)), 4_000);
    }

    #[test]
    fn test_at_most_one_active_across_toggle_sequences() {
        let base = Instant::now();
        let mut registry = TimerRegistry::with_seed(4);

        let sequence = [1u64, 2, 2, 3, 1, 4, 4, 4, 2];
        for (step, id) in sequence.into_iter().enumerate() {
            registry.toggle(id, at(base, step as u64 * 1_000)).unwrap();
            let running = registry
                .snapshot(at(base, step as u64 * 1_000))
                .iter()
                .filter(|s| s.is_active)
                .count();
            assert!(running <= 1, "step {step}: {running} timers running");
        }
    }

    #[test]
    fn test_toggle_unknown_id() {
        let base = Instant::now();
        let mut registry = TimerRegistry::with_seed(1);

        assert_eq!(registry.toggle(99, base), Err(RegistryError::NotFound(99)));
        assert_eq!(registry.active_id(), None);
    }

    #[test]
    fn test_add_assigns_fresh_ids_and_trims() {
        let base = Instant::now();
        let mut registry = TimerRegistry::with_seed(2);

        let id = registry.add("  Fit-out  ", " J2042 ", 0).unwrap();
        assert_eq!(id, 3);

        let snaps = registry.snapshot(base);
        assert_eq!(snaps[2].name, "Fit-out");
        assert_eq!(snaps[2].job_number, "J2042");
        assert!(!snaps[2].is_active);
    }

    #[test]
    fn test_add_rejects_blank_fields() {
        let mut registry = TimerRegistry::with_seed(1);

        assert_eq!(
            registry.add("", "J1", 0),
            Err(RegistryError::EmptyField { field: "name" })
        );
        assert_eq!(
            registry.add("Roof", "   ", 0),
            Err(RegistryError::EmptyField { field: "job number" })
        );
        // Nothing was created
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_edit_overwrites_without_stopping() {
        let base = Instant::now();
        let mut registry = TimerRegistry::with_seed(1);

        registry.toggle(1, base).unwrap();
        registry
            .edit(1, "Renamed", "J9999", 60_000, at(base, 10_000))
            .unwrap();

        let snap = &registry.snapshot(at(base, 10_000))[0];
        assert_eq!(snap.id, 1);
        assert!(snap.is_active);
        assert_eq!(snap.name, "Renamed");
        assert_eq!(snap.job_number, "J9999");
        // New checkpoint, delta restarts from the edit instant
        assert_eq!(snap.elapsed_ms, 60_000);
        assert_eq!(elapsed_of(&registry, 1, at(base, 12_500)), 62_500);
    }

    #[test]
    fn test_edit_idle_timer_sets_checkpoint() {
        let base = Instant::now();
        let mut registry = TimerRegistry::with_seed(1);

        registry.edit(1, "Job 1", "J1000", 90_000, base).unwrap();

        let snap = &registry.snapshot(at(base, 30_000))[0];
        assert!(!snap.is_active);
        assert_eq!(snap.elapsed_ms, 90_000);
    }

    #[test]
    fn test_edit_validation_leaves_timer_untouched() {
        let base = Instant::now();
        let mut registry = TimerRegistry::with_seed(1);

        let err = registry.edit(1, "  ", "J1", 5_000, base).unwrap_err();
        assert_eq!(err, RegistryError::EmptyField { field: "name" });

        let snap = &registry.snapshot(base)[0];
        assert_eq!(snap.name, "Job 1");
        assert_eq!(snap.elapsed_ms, 0);

        assert_eq!(
            registry.edit(42, "Roof", "J1", 0, base),
            Err(RegistryError::NotFound(42))
        );
    }

    #[test]
    fn test_archive_folds_running_time() {
        let base = Instant::now();
        let mut registry = TimerRegistry::with_seed(1);

        registry.toggle(1, base).unwrap();
        registry.archive(1, at(base, 8_000)).unwrap();

        assert_eq!(registry.active_id(), None);
        let snaps = registry.list(TimerFilter::Archived, at(base, 20_000));
        assert_eq!(snaps.len(), 1);
        assert!(!snaps[0].is_active);
        // The in-progress run was folded at the archive instant
        assert_eq!(snaps[0].elapsed_ms, 8_000);
    }

    #[test]
    fn test_archive_then_restore_preserves_time() {
        // Scenario: accumulated 10s, archive + restore round trip
        let base = Instant::now();
        let mut registry = TimerRegistry::with_seed(1);
        registry.edit(1, "Job 1", "J1000", 10_000, base).unwrap();

        registry.archive(1, base).unwrap();
        registry.restore(1).unwrap();

        let snap = &registry.snapshot(base)[0];
        assert_eq!(snap.elapsed_ms, 10_000);
        assert!(!snap.is_active);
        assert!(!snap.is_archived);
    }

    #[test]
    fn test_restore_unknown_id() {
        let mut registry = TimerRegistry::with_seed(1);
        assert_eq!(registry.restore(7), Err(RegistryError::NotFound(7)));
    }

    #[test]
    fn test_clear_all_spares_archived_timers() {
        let base = Instant::now();
        let mut registry = TimerRegistry::with_seed(3);

        registry.edit(1, "Job 1", "J1000", 5_000, base).unwrap();
        registry.edit(2, "Job 2", "J1001", 7_000, base).unwrap();
        registry.archive(2, base).unwrap();
        registry.toggle(3, base).unwrap();

        registry.clear_all();

        let now = at(base, 1_000);
        assert_eq!(registry.active_id(), None);
        assert_eq!(elapsed_of(&registry, 1, now), 0);
        assert_eq!(elapsed_of(&registry, 3, now), 0);
        // Archived history survives
        assert_eq!(elapsed_of(&registry, 2, now), 7_000);
    }

    #[test]
    fn test_list_filters_and_keeps_creation_order() {
        let base = Instant::now();
        let mut registry = TimerRegistry::with_seed(3);
        registry.archive(2, base).unwrap();

        let active: Vec<TimerId> = registry
            .list(TimerFilter::Active, base)
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(active, vec![1, 3]);

        let archived: Vec<TimerId> = registry
            .list(TimerFilter::Archived, base)
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(archived, vec![2]);
    }

    #[test]
    fn test_snapshot_is_pure() {
        let base = Instant::now();
        let mut registry = TimerRegistry::with_seed(1);
        registry.toggle(1, base).unwrap();

        let first = registry.snapshot(at(base, 2_000));
        let second = registry.snapshot(at(base, 2_000));
        assert_eq!(first, second);
        // Still running, checkpoint still zero underneath
        registry.toggle(1, at(base, 2_000)).unwrap();
        assert_eq!(elapsed_of(&registry, 1, at(base, 2_000)), 2_000);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let base = Instant::now();
        let registry = TimerRegistry::with_seed(1);

        let json = serde_json::to_value(&registry.snapshot(base)[0]).unwrap();
        assert_eq!(json["jobNumber"], "J1000");
        assert_eq!(json["elapsedMs"], 0);
        assert_eq!(json["isActive"], false);
        assert_eq!(json["isArchived"], false);
    }
}

//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use super::{RegistryError, TimerFilter, TimerId, TimerRegistry, TimerSnapshot};

/// Failures crossing the shared-state boundary.
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("registry lock poisoned: {0}")]
    Lock(String),
}

/// Shared application state: the timer registry behind its single
/// mutation point, plus server metadata and change notification.
///
/// Every command locks the registry, runs to completion, and publishes a
/// fresh snapshot before returning, so a toggle's fold-then-activate
/// sequence is never interleaved with another mutation or with the ticker.
#[derive(Debug)]
pub struct AppState {
    /// The timer collection; all mutations are serialized behind this lock
    registry: Arc<Mutex<TimerRegistry>>,
    /// Staff column value used by the CSV export
    pub staff_name: String,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel broadcasting fresh snapshots to display subscribers
    pub snapshot_tx: watch::Sender<Vec<TimerSnapshot>>,
    /// Keep the receiver alive to prevent channel closure
    _snapshot_rx: watch::Receiver<Vec<TimerSnapshot>>,
}

impl AppState {
    /// Create a new AppState seeded with `seed` starter jobs.
    pub fn new(port: u16, host: String, seed: u64, staff_name: String) -> Self {
        let registry = TimerRegistry::with_seed(seed);
        let (snapshot_tx, snapshot_rx) = watch::channel(registry.snapshot(Instant::now()));

        Self {
            registry: Arc::new(Mutex::new(registry)),
            staff_name,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Apply a mutation to the registry and notify snapshot subscribers.
    fn update_registry<T, F>(&self, action: &str, apply: F) -> Result<T, StateError>
    where
        F: FnOnce(&mut TimerRegistry, Instant) -> Result<T, RegistryError>,
    {
        let now = Instant::now();
        let (value, snapshots) = {
            let mut registry = self
                .registry
                .lock()
                .map_err(|e| StateError::Lock(e.to_string()))?;
            let value = apply(&mut *registry, now)?;
            (value, registry.snapshot(now))
        };

        // Update last action tracking
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        if self.snapshot_tx.send(snapshots).is_err() {
            warn!("No snapshot subscribers to notify");
        }

        Ok(value)
    }

    /// Read from the registry without mutating it.
    fn read_registry<T, F>(&self, read: F) -> Result<T, StateError>
    where
        F: FnOnce(&TimerRegistry, Instant) -> T,
    {
        let registry = self
            .registry
            .lock()
            .map_err(|e| StateError::Lock(e.to_string()))?;
        Ok(read(&*registry, Instant::now()))
    }

    /// Start or stop a timer; returns whether it is now running.
    pub fn toggle_timer(&self, id: TimerId) -> Result<bool, StateError> {
        let running = self.update_registry("toggle", |registry, now| registry.toggle(id, now))?;
        info!(
            "Timer {} {}",
            id,
            if running { "started" } else { "stopped" }
        );
        Ok(running)
    }

    /// Create a new timer and return its id.
    pub fn add_timer(
        &self,
        name: &str,
        job_number: &str,
        initial_ms: u64,
    ) -> Result<TimerId, StateError> {
        let id = self.update_registry("add", |registry, _| {
            registry.add(name, job_number, initial_ms)
        })?;
        info!("Added timer {} ({})", id, name.trim());
        Ok(id)
    }

    /// Overwrite a timer's name, job number and tracked time.
    pub fn edit_timer(
        &self,
        id: TimerId,
        name: &str,
        job_number: &str,
        accumulated_ms: u64,
    ) -> Result<(), StateError> {
        self.update_registry("edit", |registry, now| {
            registry.edit(id, name, job_number, accumulated_ms, now)
        })?;
        info!("Edited timer {}", id);
        Ok(())
    }

    /// Archive a timer, folding any in-progress run first.
    pub fn archive_timer(&self, id: TimerId) -> Result<(), StateError> {
        self.update_registry("archive", |registry, now| registry.archive(id, now))?;
        info!("Archived timer {}", id);
        Ok(())
    }

    /// Restore a timer from the archive.
    pub fn restore_timer(&self, id: TimerId) -> Result<(), StateError> {
        self.update_registry("restore", |registry, _| registry.restore(id))?;
        info!("Restored timer {}", id);
        Ok(())
    }

    /// Zero every non-archived timer and stop all runs.
    pub fn clear_all(&self) -> Result<(), StateError> {
        self.update_registry("clear", |registry, _| {
            registry.clear_all();
            Ok(())
        })?;
        info!("Cleared all timers");
        Ok(())
    }

    /// List one slice of the collection at the current instant.
    pub fn list_timers(&self, filter: TimerFilter) -> Result<Vec<TimerSnapshot>, StateError> {
        self.read_registry(|registry, now| registry.list(filter, now))
    }

    /// Snapshot of every timer at the current instant.
    pub fn snapshot(&self) -> Result<Vec<TimerSnapshot>, StateError> {
        self.read_registry(|registry, now| registry.snapshot(now))
    }

    /// Id of the currently running timer, if any.
    pub fn active_timer_id(&self) -> Result<Option<TimerId>, StateError> {
        self.read_registry(|registry, _| registry.active_id())
    }

    /// Recompute and publish a fresh snapshot for display subscribers.
    /// Used by the ticker; never writes to the registry.
    pub fn publish_snapshots(&self) -> Result<(), StateError> {
        let snapshots = self.read_registry(|registry, now| registry.snapshot(now))?;
        if self.snapshot_tx.send(snapshots).is_err() {
            warn!("No snapshot subscribers to notify");
        }
        Ok(())
    }

    /// Subscribe to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<Vec<TimerSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string.
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information.
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

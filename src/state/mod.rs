//! State management module
//!
//! This module contains the timer entity, the registry that owns the
//! collection, and the shared application state wrapper.

pub mod app_state;
pub mod registry;
pub mod timer;

// Re-export main types
pub use app_state::{AppState, StateError};
pub use registry::{RegistryError, TimerFilter, TimerRegistry, TimerSnapshot};
pub use timer::{Timer, TimerId};

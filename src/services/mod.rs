//! External collaborators module
//!
//! This module contains the exporter that turns registry snapshots into
//! timesheet files for downstream systems.

pub mod export;

// Re-export main functions
pub use export::{build_rows, filename, to_csv, ExportError, ExportRow};

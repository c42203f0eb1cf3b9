//! WorkflowMax-style CSV export of tracked time

use chrono::NaiveDate;
use thiserror::Error;

use crate::state::TimerSnapshot;

/// Task column value applied to every exported row.
const TASK_LABEL: &str = "Standard";

/// Export failures surfaced to the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("no timer data to export")]
    NothingToExport,
}

/// One timesheet row in the WorkflowMax import shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub staff: String,
    pub date: String,
    pub job: String,
    pub task: String,
    pub description: String,
    pub hours: String,
}

/// Convert milliseconds to decimal hours with 2 decimal places.
pub fn to_hours(ms: u64) -> String {
    format!("{:.2}", ms as f64 / (1000.0 * 60.0 * 60.0))
}

/// Build timesheet rows for `date` from the given snapshots.
///
/// Only timers that have tracked time and are not archived are included;
/// if none qualify there is nothing to export and no file should be
/// produced.
pub fn build_rows(
    snapshots: &[TimerSnapshot],
    staff: &str,
    date: NaiveDate,
) -> Result<Vec<ExportRow>, ExportError> {
    let date = date.format("%Y-%m-%d").to_string();

    let rows: Vec<ExportRow> = snapshots
        .iter()
        .filter(|s| s.elapsed_ms > 0 && !s.is_archived)
        .map(|s| ExportRow {
            staff: staff.to_string(),
            date: date.clone(),
            job: s.name.clone(),
            task: TASK_LABEL.to_string(),
            description: format!("Time tracked on {}", date),
            hours: to_hours(s.elapsed_ms),
        })
        .collect();

    if rows.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    Ok(rows)
}

/// Render rows as CSV with the WorkflowMax header line.
pub fn to_csv(rows: &[ExportRow]) -> String {
    let mut lines = vec!["Staff,Date,Job,Task,Description,Hours".to_string()];
    for row in rows {
        lines.push(format!(
            "{},{},{},{},{},{}",
            row.staff, row.date, row.job, row.task, row.description, row.hours
        ));
    }
    lines.join("\n")
}

/// Download filename for an export produced on `date`.
pub fn filename(date: NaiveDate) -> String {
    format!("time-export-{}.csv", date.format("%Y-%m-%d"))
}

//! Bounded rendering of a [`QueryJob`] for outcome reports.
//!
//! SWF caps result and detail payloads at a few kilobytes, and workflow
//! inputs routinely carry multi-kilobyte SQL.  Reports therefore carry a
//! copy of the record whose `sql_query` is cut down to a fixed size; the
//! in-memory record is never touched.

use crate::job::QueryJob;

/// Maximum characters of SQL preserved in a reported record.
const MAX_REPORTED_SQL_CHARS: usize = 1000;

/// Marker appended to truncated SQL.
const TRUNCATION_MARKER: &str = "...";

/// Serialize `job` for an outcome report, truncating oversized SQL.
pub fn job_report_json(job: &QueryJob) -> serde_json::Result<String> {
    let mut report = job.clone();
    report.sql_query = truncate_sql(&report.sql_query);
    serde_json::to_string(&report)
}

/// Cut `sql` down to [`MAX_REPORTED_SQL_CHARS`] characters, marker included.
///
/// Counts characters rather than bytes so multi-byte text in string
/// literals cannot be split mid-character.
fn truncate_sql(sql: &str) -> String {
    if sql.chars().count() <= MAX_REPORTED_SQL_CHARS {
        return sql.to_string();
    }
    let kept: String = sql
        .chars()
        .take(MAX_REPORTED_SQL_CHARS - TRUNCATION_MARKER.len())
        .collect();
    format!("{kept}{TRUNCATION_MARKER}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

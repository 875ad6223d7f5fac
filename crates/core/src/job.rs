//! The unit-of-work record exchanged with the workflow side.
//!
//! A [`QueryJob`] arrives as the JSON payload of a claimed activity task,
//! is mutated by the query executor while the query runs, and is rendered
//! back to the coordinator when the outcome is reported.  Only
//! `gcp_project` and `sql_query` are supplied by the workflow; every other
//! field is filled in on this side.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a [`QueryJob`].
///
/// Transitions are monotonic: `Pending -> Running -> {Completed, Failed}`.
/// The transition methods on [`QueryJob`] refuse to move a record out of a
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// A single BigQuery job claimed from the workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryJob {
    /// GCP project the query runs against.  Supplied by the workflow.
    pub gcp_project: String,
    /// SQL text to execute.  Supplied by the workflow; a truncated copy
    /// (never this field) is used when reporting.
    pub sql_query: String,
    /// BigQuery job identifier, assigned when execution starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// Current lifecycle state.
    #[serde(default)]
    pub status: JobStatus,
    /// Error message, populated only when the job failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// RFC3339 UTC timestamp set when execution begins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// RFC3339 UTC timestamp set when execution ends, on success or failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Rows in the query result, populated on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_count: Option<i64>,
    /// Bytes scanned by the query, populated on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_processed: Option<i64>,
}

impl QueryJob {
    /// Create a fresh `Pending` record.
    pub fn new(gcp_project: impl Into<String>, sql_query: impl Into<String>) -> Self {
        Self {
            gcp_project: gcp_project.into(),
            sql_query: sql_query.into(),
            job_id: None,
            status: JobStatus::Pending,
            error: None,
            start_time: None,
            end_time: None,
            rows_count: None,
            bytes_processed: None,
        }
    }

    /// Whether the record has reached `Completed` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, JobStatus::Completed | JobStatus::Failed)
    }

    /// Mark the job as running under the given BigQuery job id and stamp
    /// the start time.  No-op if the record is already terminal.
    pub fn begin(&mut self, job_id: impl Into<String>) {
        if self.is_terminal() {
            return;
        }
        self.job_id = Some(job_id.into());
        self.status = JobStatus::Running;
        self.start_time = Some(now_rfc3339());
    }

    /// Mark the job as completed with its result statistics and stamp the
    /// end time.  No-op if the record is already terminal.
    pub fn finish(&mut self, rows_count: i64, bytes_processed: i64) {
        if self.is_terminal() {
            return;
        }
        self.status = JobStatus::Completed;
        self.rows_count = Some(rows_count);
        self.bytes_processed = Some(bytes_processed);
        self.end_time = Some(now_rfc3339());
    }

    /// Mark the job as failed with the given message and stamp the end
    /// time.  No-op if the record is already terminal.
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.is_terminal() {
            return;
        }
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.end_time = Some(now_rfc3339());
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

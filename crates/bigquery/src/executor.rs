//! BigQuery-backed implementation of [`QueryExecutor`].
//!
//! Runs one record at a time: stamp the record running, insert the job
//! under a generated id, then repeat bounded server-side waits until the
//! job completes.  Shutdown cancellation fires a best-effort server-side
//! cancel before failing the record.

use bqflow_core::executor::QueryExecutor;
use bqflow_core::job::QueryJob;
use bqflow_core::BoxError;
use tokio_util::sync::CancellationToken;

use crate::api::{BigQueryApi, QueryResults};

/// Server-side wait per completion poll.
const RESULT_WAIT_MS: u64 = 10_000;

/// Query executor over the BigQuery REST API.
pub struct BigQueryExecutor {
    api: BigQueryApi,
}

/// Error returned when shutdown interrupts a running query.
#[derive(Debug, thiserror::Error)]
#[error("query cancelled")]
pub struct QueryCancelled;

impl BigQueryExecutor {
    /// Create an executor over the given API client.
    pub fn new(api: BigQueryApi) -> Self {
        Self { api }
    }

    /// Insert the job and wait until BigQuery reports it complete.
    async fn run_to_completion(
        &self,
        cancel: &CancellationToken,
        project: &str,
        job_id: &str,
        sql: &str,
    ) -> Result<QueryResults, BoxError> {
        self.api.insert_query_job(project, job_id, sql).await?;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    // Best effort: ask BigQuery to stop the job before
                    // failing the record.
                    if let Err(e) = self.api.cancel_job(project, job_id).await {
                        tracing::warn!(
                            job_id = %job_id,
                            error = %e,
                            "Failed to cancel BigQuery job",
                        );
                    }
                    return Err(QueryCancelled.into());
                }
                results = self.api.get_query_results(project, job_id, RESULT_WAIT_MS) => {
                    let results = results?;
                    if results.job_complete {
                        return Ok(results);
                    }
                    // Wait expired with the job still running; issue another.
                }
            }
        }
    }
}

impl QueryExecutor for BigQueryExecutor {
    async fn execute(
        &self,
        cancel: &CancellationToken,
        job: &mut QueryJob,
    ) -> Result<(), BoxError> {
        let job_id = new_job_id();
        job.begin(&job_id);

        tracing::info!(
            job_id = %job_id,
            gcp_project = %job.gcp_project,
            "Starting BigQuery query job",
        );

        match self
            .run_to_completion(cancel, &job.gcp_project, &job_id, &job.sql_query)
            .await
        {
            Ok(results) => {
                job.finish(
                    results.rows_count().unwrap_or(0),
                    results.bytes_processed().unwrap_or(0),
                );
                tracing::info!(
                    job_id = %job_id,
                    rows_count = job.rows_count.unwrap_or(0),
                    bytes_processed = job.bytes_processed.unwrap_or(0),
                    "Query completed successfully",
                );
                Ok(())
            }
            Err(e) => {
                job.fail(e.to_string());
                Err(e)
            }
        }
    }
}

/// Generate a client-side BigQuery job id.
///
/// Client-generated ids let the worker watch and cancel the job without
/// parsing the insert response, and make retried inserts idempotent.
fn new_job_id() -> String {
    format!("bqflow_{}", uuid::Uuid::new_v4().simple())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

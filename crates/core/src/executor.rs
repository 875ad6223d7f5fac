//! Query execution abstraction.
//!
//! Defines [`QueryExecutor`], the trait the dispatch loop hands claimed
//! records to.  The production implementation lives in `bqflow-bigquery`.

use tokio_util::sync::CancellationToken;

use crate::job::QueryJob;
use crate::BoxError;

/// Runs one claimed record to completion against the query engine.
///
/// Implementations mutate `job` as execution progresses: they stamp the
/// work identifier, `Running` status and start time before blocking on the
/// engine, and leave the record terminal (`Completed` with statistics, or
/// `Failed` with an error message) with an end time before returning.  The
/// returned `Err` mirrors the `Failed` state so callers can report a
/// reason without inspecting the record.
///
/// `cancel` is a shutdown signal: implementations should stop waiting and
/// fail the record promptly once it fires.
pub trait QueryExecutor: Send + Sync {
    /// Execute `job`, updating it in place.
    fn execute(
        &self,
        cancel: &CancellationToken,
        job: &mut QueryJob,
    ) -> impl std::future::Future<Output = Result<(), BoxError>> + Send;
}

//! Task queue abstraction over the workflow coordinator.
//!
//! The dispatch loop only ever talks to a [`TaskQueue`]; the production
//! implementation lives in `bqflow-swf` and integration tests script their
//! own.

use crate::BoxError;

/// A unit of work claimed from the coordinator.
#[derive(Debug, Clone)]
pub struct ClaimedTask {
    /// Opaque claim token, echoed back verbatim when reporting the outcome.
    pub task_token: String,
    /// Raw JSON payload describing the work.
    pub input: String,
}

/// Long-poll claim and outcome reporting against the task coordinator.
///
/// `poll` blocks for up to the coordinator's long-poll window and returns
/// `Ok(None)` when the window expires without work.  `complete` and `fail`
/// submit the terminal outcome for a previously claimed task.
pub trait TaskQueue: Send + Sync {
    /// Claim at most one unit of work.
    fn poll(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<ClaimedTask>, BoxError>> + Send;

    /// Report a successful outcome with its serialized result.
    fn complete(
        &self,
        task_token: &str,
        result: &str,
    ) -> impl std::future::Future<Output = Result<(), BoxError>> + Send;

    /// Report a failed outcome with a reason and optional serialized details.
    fn fail(
        &self,
        task_token: &str,
        reason: &str,
        details: Option<&str>,
    ) -> impl std::future::Future<Output = Result<(), BoxError>> + Send;
}

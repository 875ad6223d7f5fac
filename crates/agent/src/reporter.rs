//! Outcome reporting back to the task coordinator.
//!
//! Submissions are best effort: a report that fails to send is logged and
//! dropped, never retried, and never holds up an execution slot beyond the
//! one attempt.

use std::sync::Arc;

use bqflow_core::job::QueryJob;
use bqflow_core::queue::TaskQueue;
use bqflow_core::{report, BoxError};

/// Submits task outcomes through a [`TaskQueue`].
pub struct Reporter<Q> {
    queue: Arc<Q>,
}

impl<Q> Clone for Reporter<Q> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<Q: TaskQueue> Reporter<Q> {
    /// Create a reporter over the given queue.
    pub fn new(queue: Arc<Q>) -> Self {
        Self { queue }
    }

    /// Report the outcome of a claimed task.
    ///
    /// A success outcome carries the truncated record as its result; a
    /// failure outcome carries the error's display text as the reason and
    /// the truncated record (when one exists) as details.
    pub async fn report(
        &self,
        task_token: &str,
        job: Option<&QueryJob>,
        outcome: Result<(), BoxError>,
    ) {
        match outcome {
            Ok(()) => {
                let result = match job {
                    Some(job) => match report::job_report_json(job) {
                        Ok(rendered) => rendered,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to serialize job report");
                            String::new()
                        }
                    },
                    None => String::new(),
                };

                if let Err(e) = self.queue.complete(task_token, &result).await {
                    tracing::error!(
                        task_token = %task_token,
                        error = %e,
                        "Failed to submit task completion",
                    );
                }
            }
            Err(reason) => {
                let details = job.and_then(|job| match report::job_report_json(job) {
                    Ok(rendered) => Some(rendered),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to serialize job details");
                        None
                    }
                });

                if let Err(e) = self
                    .queue
                    .fail(task_token, &reason.to_string(), details.as_deref())
                    .await
                {
                    tracing::error!(
                        task_token = %task_token,
                        error = %e,
                        "Failed to submit task failure",
                    );
                }
            }
        }
    }
}

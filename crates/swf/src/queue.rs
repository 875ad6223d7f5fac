//! SWF-backed implementation of [`TaskQueue`].
//!
//! One [`SwfTaskQueue`] serves a single domain / task list pair.  Polling
//! uses SWF's 60-second server-side long poll; an expired poll comes back
//! with an empty task token and is surfaced as `Ok(None)`.

use aws_sdk_swf::types::TaskList;
use aws_smithy_types::error::display::DisplayErrorContext;
use bqflow_core::queue::{ClaimedTask, TaskQueue};
use bqflow_core::BoxError;

/// Task queue client for one SWF domain and task list.
pub struct SwfTaskQueue {
    client: aws_sdk_swf::Client,
    domain: String,
    task_list: String,
    /// Identity string attached to each poll, visible in workflow history.
    identity: String,
}

/// Errors from the SWF task queue layer.
#[derive(Debug, thiserror::Error)]
pub enum SwfError {
    /// The task list name was rejected when building the request.
    #[error("Invalid task list: {0}")]
    TaskList(String),

    /// The long-poll request failed.
    #[error("Failed to poll for activity task: {0}")]
    Poll(String),

    /// Submitting a success outcome failed.
    #[error("Failed to respond activity task completed: {0}")]
    Complete(String),

    /// Submitting a failure outcome failed.
    #[error("Failed to respond activity task failed: {0}")]
    Fail(String),
}

impl SwfTaskQueue {
    /// Create a queue client over an existing SWF client.
    pub fn new(
        client: aws_sdk_swf::Client,
        domain: impl Into<String>,
        task_list: impl Into<String>,
        identity: impl Into<String>,
    ) -> Self {
        Self {
            client,
            domain: domain.into(),
            task_list: task_list.into(),
            identity: identity.into(),
        }
    }
}

impl TaskQueue for SwfTaskQueue {
    async fn poll(&self) -> Result<Option<ClaimedTask>, BoxError> {
        let task_list = TaskList::builder()
            .name(&self.task_list)
            .build()
            .map_err(|e| SwfError::TaskList(e.to_string()))?;

        let output = self
            .client
            .poll_for_activity_task()
            .domain(&self.domain)
            .task_list(task_list)
            .identity(&self.identity)
            .send()
            .await
            .map_err(|e| SwfError::Poll(DisplayErrorContext(&e).to_string()))?;

        Ok(claimed_from(output.task_token(), output.input()))
    }

    async fn complete(&self, task_token: &str, result: &str) -> Result<(), BoxError> {
        self.client
            .respond_activity_task_completed()
            .task_token(task_token)
            .result(result)
            .send()
            .await
            .map_err(|e| SwfError::Complete(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn fail(
        &self,
        task_token: &str,
        reason: &str,
        details: Option<&str>,
    ) -> Result<(), BoxError> {
        self.client
            .respond_activity_task_failed()
            .task_token(task_token)
            .reason(reason)
            .set_details(details.map(str::to_string))
            .send()
            .await
            .map_err(|e| SwfError::Fail(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}

/// Translate a poll response into a claimed task.
///
/// The task token is a required response member; SWF signals an expired
/// long poll with an empty token rather than an error, so an empty token
/// maps to `None`.
fn claimed_from(task_token: &str, input: Option<&str>) -> Option<ClaimedTask> {
    if task_token.is_empty() {
        return None;
    }
    Some(ClaimedTask {
        task_token: task_token.to_string(),
        input: input.unwrap_or_default().to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_task_token_means_no_work() {
        // SWF returns an empty token when the 60s long poll expires.
        assert!(claimed_from("", None).is_none());
        assert!(claimed_from("", Some("ignored")).is_none());
    }

    #[test]
    fn token_with_input_yields_a_claim() {
        let claimed = claimed_from("tok-1", Some(r#"{"sql_query":"SELECT 1"}"#))
            .expect("claim expected");
        assert_eq!(claimed.task_token, "tok-1");
        assert_eq!(claimed.input, r#"{"sql_query":"SELECT 1"}"#);
    }

    #[test]
    fn token_without_input_yields_an_empty_payload() {
        let claimed = claimed_from("tok-2", None).expect("claim expected");
        assert_eq!(claimed.task_token, "tok-2");
        assert_eq!(claimed.input, "");
    }

    #[test]
    fn error_display_carries_the_operation() {
        let err = SwfError::Poll("timeout".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to poll for activity task: timeout"
        );
    }
}

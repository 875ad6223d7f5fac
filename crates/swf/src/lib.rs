//! AWS Simple Workflow Service client library.
//!
//! Implements the task queue seam over SWF activity tasks: long-poll
//! claiming via `PollForActivityTask` and outcome reporting via
//! `RespondActivityTaskCompleted` / `RespondActivityTaskFailed`.

pub mod queue;

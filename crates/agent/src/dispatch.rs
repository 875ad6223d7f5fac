//! Bounded-concurrency dispatch loop.
//!
//! One long-lived task owns a fixed pool of execution slots.  Each
//! iteration claims a slot, long-polls the coordinator for work while
//! holding it, and either returns the slot straight away (no work, poll
//! error, malformed payload) or hands slot and work to a spawned
//! execution that reports its outcome before releasing the slot.
//! Shutdown stops claiming immediately and then reclaims the whole pool,
//! which is exactly a wait for every in-flight execution to finish
//! reporting.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use bqflow_core::executor::QueryExecutor;
use bqflow_core::job::QueryJob;
use bqflow_core::queue::TaskQueue;

use crate::reporter::Reporter;

/// The dispatch loop.
///
/// Generic over the queue and executor seams so integration tests can
/// script both sides.
pub struct Dispatcher<Q, E> {
    queue: Arc<Q>,
    executor: Arc<E>,
    reporter: Reporter<Q>,
    /// Execution slot pool.  A slot is held from the moment a poll is
    /// issued until the claimed work (if any) has been reported.
    slots: Arc<Semaphore>,
    max_concurrent: u32,
}

impl<Q, E> Dispatcher<Q, E>
where
    Q: TaskQueue + 'static,
    E: QueryExecutor + 'static,
{
    /// Create a dispatcher with `max_concurrent` execution slots.
    ///
    /// The count is a `u32` so the shutdown drain can always reclaim the
    /// whole pool in one `acquire_many` call.
    pub fn new(queue: Arc<Q>, executor: Arc<E>, max_concurrent: u32) -> Self {
        let reporter = Reporter::new(Arc::clone(&queue));
        Self {
            queue,
            executor,
            reporter,
            slots: Arc::new(Semaphore::new(max_concurrent as usize)),
            max_concurrent,
        }
    }

    /// Run the dispatch loop until the cancellation token is triggered,
    /// then drain all in-flight executions before returning.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(max_concurrent = self.max_concurrent, "Dispatcher started");

        loop {
            // Claim a slot before polling, so at most `max_concurrent`
            // polls-or-executions are ever in flight.
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                permit = Arc::clone(&self.slots).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break, // pool closed
                },
            };

            // Long-poll for one unit of work while holding the slot.
            // Cancellation abandons the in-flight poll.
            let claimed = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    drop(permit);
                    break;
                }
                claimed = self.queue.poll() => claimed,
            };

            let task = match claimed {
                Ok(Some(task)) => task,
                Ok(None) => {
                    // Long poll expired without work; the poll itself
                    // paces the loop, so go straight back around.
                    drop(permit);
                    continue;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to poll for task");
                    drop(permit);
                    continue;
                }
            };

            let job = match serde_json::from_str::<QueryJob>(&task.input) {
                Ok(job) => job,
                Err(e) => {
                    // Terminal for this claim only.  The slot goes back
                    // first so the report cannot hold up the pool.
                    drop(permit);
                    tracing::warn!(
                        task_token = %task.task_token,
                        error = %e,
                        "Claimed task has malformed input",
                    );
                    self.reporter
                        .report(
                            &task.task_token,
                            None,
                            Err(format!("invalid input: {e}").into()),
                        )
                        .await;
                    continue;
                }
            };

            tracing::info!(
                task_token = %task.task_token,
                gcp_project = %job.gcp_project,
                "Processing task",
            );

            let executor = Arc::clone(&self.executor);
            let reporter = self.reporter.clone();
            let child_cancel = cancel.child_token();
            tokio::spawn(async move {
                let mut job = job;
                let outcome = executor.execute(&child_cancel, &mut job).await;
                reporter.report(&task.task_token, Some(&job), outcome).await;
                drop(permit);
            });
        }

        // Every spawned execution holds its slot until the outcome is
        // reported, so reclaiming the whole pool is the drain barrier.
        tracing::info!("Dispatcher draining in-flight queries");
        let _ = self.slots.acquire_many(self.max_concurrent).await;
        tracing::info!("Dispatcher stopped");
    }
}

//! Shared types and seam traits for the bqflow worker.
//!
//! Defines the [`job::QueryJob`] record that travels through the system,
//! the [`queue::TaskQueue`] and [`executor::QueryExecutor`] traits that the
//! service crates implement, and the bounded report rendering used when
//! submitting outcomes back to the coordinator.

pub mod executor;
pub mod job;
pub mod queue;
pub mod report;

/// Boxed error type used at the trait seams.
///
/// Service crates keep their own `thiserror` enums and box them when
/// crossing into the core, so the dispatch loop stays decoupled from
/// any particular backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

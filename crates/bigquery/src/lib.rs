//! BigQuery client library.
//!
//! Provides service-account authentication, a thin wrapper over the
//! BigQuery REST v2 job endpoints, and the query executor that runs
//! claimed records to completion.

pub mod api;
pub mod auth;
pub mod executor;

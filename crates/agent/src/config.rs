//! Agent configuration loaded from environment variables.

/// Default identity string reported to SWF on each poll.
const DEFAULT_IDENTITY: &str = "bigquery-worker";

/// Default ceiling on concurrently executing queries.
const DEFAULT_MAX_CONCURRENT_QUERIES: u32 = 10;

/// Worker agent configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// SWF domain to poll.
    pub swf_domain: String,
    /// SWF task list to poll.
    pub swf_task_list: String,
    /// Identity string attached to each poll, visible in workflow history.
    pub swf_identity: String,
    /// Ceiling on concurrently executing queries.
    pub max_concurrent_queries: u32,
}

impl AgentConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                 | Required | Default           |
    /// |--------------------------|----------|-------------------|
    /// | `SWF_DOMAIN`             | yes      | --                |
    /// | `SWF_TASK_LIST`          | yes      | --                |
    /// | `SWF_IDENTITY`           | no       | `bigquery-worker` |
    /// | `MAX_CONCURRENT_QUERIES` | no       | `10`              |
    ///
    /// Logs an error and exits the process when a required variable is
    /// missing or a value fails to parse.
    pub fn from_env() -> Self {
        let swf_domain = std::env::var("SWF_DOMAIN").unwrap_or_else(|_| {
            tracing::error!("SWF_DOMAIN environment variable is required");
            std::process::exit(1);
        });

        let swf_task_list = std::env::var("SWF_TASK_LIST").unwrap_or_else(|_| {
            tracing::error!("SWF_TASK_LIST environment variable is required");
            std::process::exit(1);
        });

        let swf_identity =
            std::env::var("SWF_IDENTITY").unwrap_or_else(|_| DEFAULT_IDENTITY.to_string());

        let max_concurrent_queries: u32 = match std::env::var("MAX_CONCURRENT_QUERIES") {
            Ok(raw) => parse_max_concurrent(&raw).unwrap_or_else(|| {
                tracing::error!(value = %raw, "MAX_CONCURRENT_QUERIES must be a nonzero u32");
                std::process::exit(1);
            }),
            Err(_) => DEFAULT_MAX_CONCURRENT_QUERIES,
        };

        Self {
            swf_domain,
            swf_task_list,
            swf_identity,
            max_concurrent_queries,
        }
    }
}

/// Parse a concurrency ceiling: rejects zero, junk, and anything that
/// overflows `u32`.
fn parse_max_concurrent(raw: &str) -> Option<u32> {
    raw.parse().ok().filter(|&n| n > 0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

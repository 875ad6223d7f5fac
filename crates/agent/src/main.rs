//! `bqflow-agent` -- SWF activity worker that runs BigQuery jobs.
//!
//! Long-polls an SWF task list for activity tasks whose inputs describe
//! BigQuery queries, executes up to `MAX_CONCURRENT_QUERIES` of them in
//! parallel, and reports each outcome back to SWF.
//!
//! # Environment variables
//!
//! | Variable                         | Required | Default           | Description                        |
//! |----------------------------------|----------|-------------------|------------------------------------|
//! | `SWF_DOMAIN`                     | yes      | --                | SWF domain to poll                 |
//! | `SWF_TASK_LIST`                  | yes      | --                | SWF task list to poll              |
//! | `SWF_IDENTITY`                   | no       | `bigquery-worker` | Poll identity shown in history     |
//! | `MAX_CONCURRENT_QUERIES`         | no       | `10`              | Concurrent query ceiling           |
//! | `GOOGLE_APPLICATION_CREDENTIALS` | yes      | --                | Path to the service account key    |
//!
//! AWS credentials and region come from the standard SDK environment
//! (`AWS_REGION`, `AWS_ACCESS_KEY_ID`, ...).

use std::sync::Arc;

use aws_config::BehaviorVersion;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bqflow_agent::config::AgentConfig;
use bqflow_agent::dispatch::Dispatcher;
use bqflow_bigquery::api::BigQueryApi;
use bqflow_bigquery::auth::{ServiceAccountKey, TokenProvider};
use bqflow_bigquery::executor::BigQueryExecutor;
use bqflow_swf::queue::SwfTaskQueue;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bqflow_agent=info,bqflow_bigquery=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AgentConfig::from_env();

    let key = ServiceAccountKey::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load Google service account key");
        std::process::exit(1);
    });

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let swf_client = aws_sdk_swf::Client::new(&aws_config);

    tracing::info!(
        domain = %config.swf_domain,
        task_list = %config.swf_task_list,
        identity = %config.swf_identity,
        max_concurrent_queries = config.max_concurrent_queries,
        "Starting bqflow-agent",
    );

    let queue = Arc::new(SwfTaskQueue::new(
        swf_client,
        config.swf_domain.clone(),
        config.swf_task_list.clone(),
        config.swf_identity.clone(),
    ));
    let executor = Arc::new(BigQueryExecutor::new(BigQueryApi::new(TokenProvider::new(
        key,
    ))));
    let dispatcher = Dispatcher::new(queue, executor, config.max_concurrent_queries);

    let cancel = tokio_util::sync::CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_cancel.cancel();
    });

    dispatcher.run(cancel).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the worker
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

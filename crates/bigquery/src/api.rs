//! REST client for the BigQuery v2 job endpoints.
//!
//! Wraps the three calls the worker needs -- `jobs.insert`,
//! `jobs.getQueryResults` and `jobs.cancel` -- using [`reqwest`].  Job
//! identifiers are generated client-side, so inserting and watching a job
//! never depends on parsing the insert response.

use serde::Deserialize;

use crate::auth::{AuthError, TokenProvider};

/// Production endpoint for the BigQuery v2 API.
const DEFAULT_BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// HTTP client for the BigQuery job API.
pub struct BigQueryApi {
    client: reqwest::Client,
    base_url: String,
    auth: TokenProvider,
}

/// Subset of the `jobs.getQueryResults` response the worker consumes.
///
/// BigQuery encodes 64-bit counters as decimal strings on the wire; the
/// accessors parse them.  While the job is still running only
/// `job_complete` is meaningful and the counters are absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResults {
    /// Whether the job has finished.
    #[serde(default)]
    pub job_complete: bool,
    /// Rows in the result set, as a decimal string.
    #[serde(default)]
    pub total_rows: Option<String>,
    /// Bytes scanned by the query, as a decimal string.
    #[serde(default)]
    pub total_bytes_processed: Option<String>,
}

impl QueryResults {
    /// Rows in the result set, when reported.
    pub fn rows_count(&self) -> Option<i64> {
        self.total_rows.as_deref().and_then(|v| v.parse().ok())
    }

    /// Bytes scanned by the query, when reported.
    pub fn bytes_processed(&self) -> Option<i64> {
        self.total_bytes_processed
            .as_deref()
            .and_then(|v| v.parse().ok())
    }
}

/// Error document returned by Google APIs.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Errors from the BigQuery REST layer.
#[derive(Debug, thiserror::Error)]
pub enum BigQueryApiError {
    /// Obtaining a bearer token failed.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// BigQuery returned a non-2xx status code.
    #[error("BigQuery API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error document, or the raw body.
        message: String,
    },
}

impl BigQueryApi {
    /// Create an API client against the production endpoint.
    pub fn new(auth: TokenProvider) -> Self {
        Self::with_base_url(auth, DEFAULT_BASE_URL.to_string())
    }

    /// Create an API client against a custom endpoint (emulators, tests).
    pub fn with_base_url(auth: TokenProvider, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            auth,
        }
    }

    /// Insert a query job under a client-generated job id.
    ///
    /// Sends a `POST /projects/{project}/jobs` request with a standard-SQL
    /// query configuration.  The server runs the job asynchronously;
    /// completion is observed via [`BigQueryApi::get_query_results`].
    pub async fn insert_query_job(
        &self,
        project: &str,
        job_id: &str,
        sql: &str,
    ) -> Result<(), BigQueryApiError> {
        let token = self.auth.access_token().await?;
        let body = serde_json::json!({
            "jobReference": {
                "projectId": project,
                "jobId": job_id,
            },
            "configuration": {
                "query": {
                    "query": sql,
                    "useLegacySql": false,
                },
            },
        });

        let response = self
            .client
            .post(format!("{}/projects/{}/jobs", self.base_url, project))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Wait for and fetch the completion state of a query job.
    ///
    /// Sends a `GET /projects/{project}/queries/{job_id}` request with a
    /// server-side wait of `timeout_ms`: the call returns early once the
    /// job completes, or after the wait with `job_complete = false`.
    /// `maxResults=0` suppresses row data; the worker only needs the
    /// counters.
    pub async fn get_query_results(
        &self,
        project: &str,
        job_id: &str,
        timeout_ms: u64,
    ) -> Result<QueryResults, BigQueryApiError> {
        let token = self.auth.access_token().await?;
        let timeout_ms = timeout_ms.to_string();

        let response = self
            .client
            .get(format!(
                "{}/projects/{}/queries/{}",
                self.base_url, project, job_id
            ))
            .query(&[("timeoutMs", timeout_ms.as_str()), ("maxResults", "0")])
            .bearer_auth(token)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Request cancellation of a running job.
    ///
    /// Sends a `POST /projects/{project}/jobs/{job_id}/cancel` request.
    /// BigQuery treats this as best effort; the job may still run to
    /// completion.
    pub async fn cancel_job(&self, project: &str, job_id: &str) -> Result<(), BigQueryApiError> {
        let token = self.auth.access_token().await?;

        let response = self
            .client
            .post(format!(
                "{}/projects/{}/jobs/{}/cancel",
                self.base_url, project, job_id
            ))
            .bearer_auth(token)
            .send()
            .await?;

        Self::check_status(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code.  Returns the
    /// response unchanged on success, or a [`BigQueryApiError::Api`]
    /// carrying the extracted error message on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BigQueryApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(BigQueryApiError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BigQueryApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), BigQueryApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

/// Pull the human-readable message out of a Google API error document,
/// falling back to the raw body when it is not the expected shape.
fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

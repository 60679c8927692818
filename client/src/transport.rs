use std::pin::pin;

use futures::future::{Either, select};
use gloo_net::http::{Request, RequestBuilder, Response};
use gloo_timers::future::TimeoutFuture;
use thiserror::Error;
use vrp_live_shared::{ErrorBody, SolutionSnapshot};

use crate::config::ClientConfig;

const TRANSPORT_FAILURE_TITLE: &str = "Failed to process response";

/// The three calls the solver service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Status,
    Solve,
    StopSolving,
}

impl Operation {
    pub fn path(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Solve => "solve",
            Self::StopSolving => "stopSolving",
        }
    }

    /// Title used when the service rejects the call.
    pub fn rejection_title(self) -> &'static str {
        match self {
            Self::Status => "Get status failed",
            Self::Solve => "Start solving failed",
            Self::StopSolving => "Stop solving failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The service answered with a non-2xx status.
    #[error("{title} ({status}: {status_text}).")]
    Rejected {
        title: &'static str,
        status: u16,
        status_text: String,
        diagnostic: String,
    },
    /// No usable response: network error, timeout, or an undecodable body.
    #[error("{title}.")]
    Transport {
        title: &'static str,
        diagnostic: String,
    },
}

impl ClientError {
    /// Classify a non-2xx response. A body that is empty or not the expected
    /// JSON shape degrades to an empty diagnostic.
    pub fn rejected(op: Operation, status: u16, status_text: impl Into<String>, body: &str) -> Self {
        let diagnostic = if body.trim().is_empty() {
            String::new()
        } else {
            ErrorBody::parse(body)
                .map(|b| b.diagnostic())
                .unwrap_or_default()
        };
        Self::Rejected {
            title: op.rejection_title(),
            status,
            status_text: status_text.into(),
            diagnostic,
        }
    }

    pub fn transport(diagnostic: impl Into<String>) -> Self {
        Self::Transport {
            title: TRANSPORT_FAILURE_TITLE,
            diagnostic: diagnostic.into(),
        }
    }

    pub fn diagnostic(&self) -> &str {
        match self {
            Self::Rejected { diagnostic, .. } | Self::Transport { diagnostic, .. } => diagnostic,
        }
    }
}

/// Decode a `status` body. Undecodable success bodies are transport failures.
fn decode_snapshot(body: &str) -> Result<SolutionSnapshot, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::transport(format!("parse error: {e}")))
}

/// Remote solver lifecycle and status calls. Futures are polled on the single
/// UI thread, so implementations need not be `Send`.
pub trait SolverTransport {
    async fn fetch_status(&self) -> Result<SolutionSnapshot, ClientError>;
    async fn start_solving(&self) -> Result<(), ClientError>;
    async fn stop_solving(&self) -> Result<(), ClientError>;
}

/// `fetch`-backed transport for the browser.
pub struct HttpTransport {
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    fn request(&self, op: Operation) -> RequestBuilder {
        let url = self.config.endpoint(op.path());
        let builder = match op {
            Operation::Status => Request::get(&url),
            Operation::Solve | Operation::StopSolving => Request::post(&url),
        };
        builder
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
    }

    /// Send `op`, racing the request against the configured timeout, and map
    /// non-2xx answers to [`ClientError::Rejected`].
    async fn send(&self, op: Operation) -> Result<Response, ClientError> {
        let timeout_ms = self.config.request_timeout_ms;
        let request = pin!(self.request(op).send());
        let timeout = pin!(TimeoutFuture::new(timeout_ms));

        let resp = match select(request, timeout).await {
            Either::Left((result, _)) => {
                result.map_err(|e| ClientError::transport(format!("fetch error: {e}")))?
            }
            Either::Right(_) => {
                return Err(ClientError::transport(format!(
                    "{} request timed out after {timeout_ms}ms",
                    op.path()
                )));
            }
        };

        if !resp.ok() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::rejected(
                op,
                resp.status(),
                resp.status_text(),
                &body,
            ));
        }
        Ok(resp)
    }
}

impl SolverTransport for HttpTransport {
    async fn fetch_status(&self) -> Result<SolutionSnapshot, ClientError> {
        let resp = self.send(Operation::Status).await?;
        let body = resp
            .text()
            .await
            .map_err(|e| ClientError::transport(format!("read error: {e}")))?;
        decode_snapshot(&body)
    }

    async fn start_solving(&self) -> Result<(), ClientError> {
        self.send(Operation::Solve).await.map(|_| ())
    }

    async fn stop_solving(&self) -> Result<(), ClientError> {
        self.send(Operation::StopSolving).await.map(|_| ())
    }
}

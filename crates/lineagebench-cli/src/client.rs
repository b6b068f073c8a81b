//! HTTP client for the lineage parser service.
//!
//! The service contract is a single JSON POST per statement. The client owns
//! a Tokio runtime and blocks on each request so the evaluation pipeline stays
//! synchronous.

use std::time::Duration;

use lineagebench_core::{
    LineageParser, ParseRequest, ParsedLineageResult, TransportError, TransportErrorKind,
};
use thiserror::Error;
use tokio::runtime::Runtime;

/// Default request path of the parse endpoint.
pub const DEFAULT_PARSE_PATH: &str = "/lineage/parse";

/// Connection settings for [`HttpLineageParser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL, e.g. `http://localhost:8080`
    pub server: String,
    pub parse_path: String,
    /// Sent as a bearer token when present
    pub token: Option<String>,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn endpoint(&self) -> String {
        let server = self.server.trim_end_matches('/');
        let path = self.parse_path.trim_start_matches('/');
        format!("{server}/{path}")
    }
}

/// Errors raised while talking to the parser service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<ClientError> for TransportError {
    fn from(err: ClientError) -> Self {
        let message = err.to_string();
        match err {
            ClientError::Status { status, .. } => TransportError::with_status(message, status),
            ClientError::Decode(_) => {
                TransportError::new(message).with_kind(TransportErrorKind::Decode)
            }
            ClientError::Http(inner) if inner.is_timeout() => {
                TransportError::new(message).with_kind(TransportErrorKind::Timeout)
            }
            ClientError::Http(inner) if inner.is_connect() => {
                TransportError::new(message).with_kind(TransportErrorKind::Connection)
            }
            ClientError::Http(inner) if inner.is_decode() => {
                TransportError::new(message).with_kind(TransportErrorKind::Decode)
            }
            ClientError::Http(_) | ClientError::Runtime(_) => TransportError::new(message),
        }
    }
}

/// [`LineageParser`] backed by the HTTP parse endpoint.
pub struct HttpLineageParser {
    runtime: Runtime,
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpLineageParser {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(ClientError::Runtime)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            runtime,
            client: builder.build()?,
            endpoint: config.endpoint(),
            token: config.token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, request: &ParseRequest<'_>) -> Result<ParsedLineageResult, ClientError> {
        let mut call = self.client.post(&self.endpoint).json(request);
        if let Some(token) = &self.token {
            call = call.bearer_auth(token);
        }

        let response = call.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl LineageParser for HttpLineageParser {
    fn parse(&self, request: &ParseRequest<'_>) -> Result<ParsedLineageResult, TransportError> {
        self.runtime
            .block_on(self.send(request))
            .map_err(TransportError::from)
    }
}

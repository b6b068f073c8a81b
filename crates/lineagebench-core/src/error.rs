//! Error types for lineage parser evaluation.
//!
//! # Error Handling Strategy
//!
//! Per-statement failures never abort a run:
//!
//! - [`TransportError`]: the call to the lineage parser failed (connection,
//!   timeout, HTTP status, undecodable body). The evaluation pipeline records it
//!   as the outcome's RPC error and moves on to the next statement.
//!
//! - Parser errors reported through the result's debug channel are plain data on
//!   [`crate::ParsedLineageResult`] and end up as the outcome's parser error.
//!
//! [`EngineError`] is reserved for conditions that make the whole batch invalid.

use std::fmt;
use thiserror::Error;

/// Failure to obtain a result from the lineage parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    /// Human-readable error message.
    pub message: String,
    /// The category of failure.
    pub kind: TransportErrorKind,
    /// HTTP status code, when the service answered.
    pub status: Option<u16>,
}

/// Category of transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportErrorKind {
    /// Could not connect to the service.
    Connection,
    /// The request did not complete in time.
    Timeout,
    /// The service rejected the credentials.
    Auth,
    /// The service answered with a non-success status.
    Status,
    /// The response body could not be decoded.
    Decode,
    #[default]
    Other,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: TransportErrorKind::Other,
            status: None,
        }
    }

    /// Creates an error for a non-success HTTP status.
    ///
    /// 401 and 403 are classified as [`TransportErrorKind::Auth`].
    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        let kind = match status {
            401 | 403 => TransportErrorKind::Auth,
            _ => TransportErrorKind::Status,
        };
        Self {
            message: message.into(),
            kind,
            status: Some(status),
        }
    }

    pub fn with_kind(mut self, kind: TransportErrorKind) -> Self {
        self.kind = kind;
        self
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transport error")?;

        if let Some(status) = self.status {
            write!(f, " (status {status})")?;
        }

        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for TransportError {}

/// Batch-level failure of the evaluation pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("no SQL statements to evaluate")]
    EmptyBatch,
}

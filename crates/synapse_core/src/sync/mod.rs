//! Local-first sync of captured records to the remote endpoint.
//!
//! # Responsibility
//! - Commit every record to the activity store before any remote attempt.
//! - Enrich the stored record with the remote summary/category, or with a
//!   locally derived fallback summary when no endpoint is configured.
//!
//! # Invariants
//! - A sync failure never removes or rewrites the local copy.
//! - Enrichment targets the record by id, never by position.
//! - No retries.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod client;
pub mod fallback;
pub mod protocol;
pub mod transport;

/// Remote sync failure. The record is already saved locally when one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Transport failure (connect, timeout, body read).
    Network(String),
    /// Response not parseable or missing expected fields.
    Protocol(String),
    /// Remote answered with `status: "error"` (bad access key, server fault).
    Rejected(String),
}

impl SyncError {
    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "network_error",
            Self::Protocol(_) => "protocol_error",
            Self::Rejected(_) => "remote_rejection",
        }
    }
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(message) => write!(f, "network error: {message}"),
            Self::Protocol(message) => write!(f, "protocol error: {message}"),
            Self::Rejected(message) => write!(f, "remote rejected note: {message}"),
        }
    }
}

impl Error for SyncError {}

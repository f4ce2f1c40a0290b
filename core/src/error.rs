//! Error types for the item sync core.
//!
//! # Design
//! Three layers, each converted at the boundary above it and never leaking
//! past it: [`TransportError`](crate::transport::TransportError) for I/O,
//! [`ApiError`] for status and decode problems inside the client, and
//! [`SyncError`] — the taxonomy the controller hands to callers. Each
//! `SyncError` variant carries the originating operation's parameters so a
//! caller can retry, plus the server's human-readable detail when one was
//! sent; the `Display` output is suitable for direct toast presentation.

use thiserror::Error;

use crate::types::{ItemDraft, ListQuery};

/// Errors produced by `ItemsClient` parse methods.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The server returned 404. Carries the server's `detail` message,
    /// which distinguishes an out-of-range page from a missing item.
    #[error("not found: {detail}")]
    NotFound { detail: String },

    /// The server returned a non-success status other than 404.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// The response body could not be decoded into the expected type.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// The request payload could not be encoded to JSON.
    #[error("could not encode request: {0}")]
    Encode(String),
}

impl ApiError {
    /// The human-readable message for this error, for embedding in a
    /// [`SyncError`].
    pub fn detail(&self) -> String {
        match self {
            ApiError::NotFound { detail } | ApiError::Http { detail, .. } => detail.clone(),
            ApiError::Decode(msg) | ApiError::Encode(msg) => msg.clone(),
        }
    }
}

/// Which kind of request is holding the controller busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InFlight {
    Refresh,
    Mutation,
}

impl std::fmt::Display for InFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InFlight::Refresh => write!(f, "refresh"),
            InFlight::Mutation => write!(f, "mutation"),
        }
    }
}

/// Errors the controller hands to callers. The four backend variants wrap
/// the failed operation's parameters and the optional server detail; `Busy`
/// is the state-machine rejection for an operation started while another
/// request is in flight.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    #[error("could not load items{}", detail_suffix(.detail))]
    FetchFailed {
        query: ListQuery,
        detail: Option<String>,
    },

    #[error("could not create item{}", detail_suffix(.detail))]
    CreateFailed {
        draft: ItemDraft,
        detail: Option<String>,
    },

    #[error("could not update item{}", detail_suffix(.detail))]
    UpdateFailed {
        id: u64,
        draft: ItemDraft,
        detail: Option<String>,
    },

    #[error("could not delete item{}", detail_suffix(.detail))]
    DeleteFailed { id: u64, detail: Option<String> },

    #[error("a {0} request is already in flight")]
    Busy(InFlight),
}

impl SyncError {
    /// The server-supplied detail, when the failure carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            SyncError::FetchFailed { detail, .. }
            | SyncError::CreateFailed { detail, .. }
            | SyncError::UpdateFailed { detail, .. }
            | SyncError::DeleteFailed { detail, .. } => detail.as_deref(),
            SyncError::Busy(_) => None,
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {detail}"),
        None => String::new(),
    }
}

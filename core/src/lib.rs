//! Client-side list state synchronization for a paginated, searchable
//! item collection behind a REST backend.
//!
//! # Overview
//! The crate keeps a list screen's local state — current page, page size,
//! search term, in-flight edit — consistent with server state across the
//! four REST operations (list, create, update, delete), including the
//! page-rollback rule after a delete empties a trailing page and the
//! latest-refresh-wins ordering for overlapping list requests.
//!
//! # Design
//! - `ItemsClient` is stateless — it holds only an `ApiConfig`. Each REST
//!   operation is split into `build_*` (produces a request) and `parse_*`
//!   (consumes a response), so the I/O boundary is explicit.
//! - `ListSyncController` owns the `ViewState` and issues pending-request
//!   tickets; the host executes them over a `Transport` and applies the
//!   outcomes (host-does-IO pattern). `SyncSession` is the bundled host,
//!   with delete confirmation injected as a capability.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod controller;
pub mod error;
pub mod http;
pub mod session;
pub mod transport;
pub mod types;

pub use client::{ApiConfig, ItemsClient};
pub use controller::{
    Applied, ListSyncController, PendingRefresh, PendingRemove, PendingSubmit, SubmitApplied,
};
pub use error::{ApiError, InFlight, SyncError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{AlwaysConfirm, ConfirmDelete, RemoveOutcome, SubmitOutcome, SyncSession};
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{
    group_by_category, CategoryGroup, Item, ItemDraft, ItemPage, ListQuery, ViewState,
    DEFAULT_PAGE_SIZE, PAGE_SIZE_CHOICES, UNCATEGORIZED,
};

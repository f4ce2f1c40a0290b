//! The list synchronization state machine.
//!
//! # Design
//! `ListSyncController` owns the [`ViewState`] and mediates every mutation
//! through the backend, but never performs I/O itself. Each operation is
//! split the same way the client is: a `begin_*`/parameter method issues a
//! pending-request ticket wrapping the `HttpRequest` to execute, the host
//! runs the round-trip, and the matching `apply_*` method reconciles the
//! outcome into the state. The suspension points of the design are exactly
//! the gaps between issue and apply.
//!
//! Two rules keep the state consistent across those gaps:
//!
//! - **Single mutation in flight.** `begin_submit` and `begin_remove` start
//!   only from idle; anything else is rejected with [`SyncError::Busy`].
//!   Refreshes may supersede an in-flight refresh (rapid page clicks,
//!   search keystrokes) but never start while a mutation is pending.
//! - **Latest refresh wins.** Every refresh ticket carries a monotonically
//!   increasing sequence number; `apply_refresh` applies a response only if
//!   its ticket is the latest issued and reports [`Applied::Stale`]
//!   otherwise, leaving all state untouched. Tickets are consumed by value,
//!   so an outcome cannot be applied twice.
//!
//! Search refreshes are deliberately not debounced: a host may issue one
//! per keystroke and rely on the stale-discard rule.

use log::{debug, warn};

use crate::client::ItemsClient;
use crate::error::{InFlight, SyncError};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::TransportError;
use crate::types::{Item, ItemDraft, ListQuery, ViewState};

/// What the controller is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Refreshing,
    Mutating,
}

/// A list request waiting to be executed and applied.
///
/// Dropping a ticket without applying it strands `is_loading`; hosts must
/// run every ticket to its `apply_refresh`, even just to learn it was
/// superseded.
#[derive(Debug)]
pub struct PendingRefresh {
    seq: u64,
    query: ListQuery,
    request: HttpRequest,
}

impl PendingRefresh {
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }
}

/// A create or update request waiting to be executed and applied. Carries
/// the submitted draft so a failure can hand it back to the caller.
#[derive(Debug)]
pub struct PendingSubmit {
    /// `Some(id)` for an edit, `None` for a create.
    target: Option<u64>,
    draft: ItemDraft,
    request: HttpRequest,
}

impl PendingSubmit {
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }
}

/// A delete request waiting to be executed and applied.
#[derive(Debug)]
pub struct PendingRemove {
    id: u64,
    request: HttpRequest,
}

impl PendingRemove {
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Outcome of applying a refresh response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The response was the latest issued and the state now reflects it.
    Updated,
    /// The ticket was superseded by a newer refresh; nothing changed.
    Stale,
}

/// Outcome of applying a successful submit response.
#[derive(Debug)]
pub enum SubmitApplied {
    /// An edit was written and the matching item replaced in place; no
    /// refresh is needed.
    Edited(Item),
    /// A create was written; the page was reset to 1 and the host must run
    /// the follow-up refresh (`is_loading` stays true until it settles).
    Created {
        item: Item,
        refresh: PendingRefresh,
    },
}

/// Owns the view state and the request lifecycle of the list screen.
#[derive(Debug)]
pub struct ListSyncController {
    client: ItemsClient,
    state: ViewState,
    phase: Phase,
    next_seq: u64,
    latest_refresh: u64,
}

impl ListSyncController {
    pub fn new(client: ItemsClient) -> Self {
        Self {
            client,
            state: ViewState::new(),
            phase: Phase::Idle,
            next_seq: 0,
            latest_refresh: 0,
        }
    }

    /// Read-only view of the current state. Callers observe it and issue
    /// operations; they never mutate it directly.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// The kind of request currently in flight, if any.
    pub fn in_flight(&self) -> Option<InFlight> {
        match self.phase {
            Phase::Idle => None,
            Phase::Refreshing => Some(InFlight::Refresh),
            Phase::Mutating => Some(InFlight::Mutation),
        }
    }

    /// Form fields for keystroke updates. Draft edits are local and allowed
    /// in any phase; only operation starts are gated.
    pub fn draft_mut(&mut self) -> &mut ItemDraft {
        &mut self.state.draft
    }

    /// Target `id` for editing and prefill the draft from its current
    /// fields. Returns false when the id is not on the current page.
    pub fn begin_edit(&mut self, id: u64) -> bool {
        match self.state.items.iter().find(|item| item.id == id) {
            Some(item) => {
                self.state.draft = ItemDraft::from(item);
                self.state.editing_id = Some(id);
                true
            }
            None => false,
        }
    }

    /// Drop the edit target and reset the draft to an empty new-item form.
    pub fn cancel_edit(&mut self) {
        self.state.editing_id = None;
        self.state.draft.clear();
    }

    /// Re-issue the list request with the current parameters.
    pub fn refresh(&mut self) -> Result<PendingRefresh, SyncError> {
        self.refresh_allowed()?;
        Ok(self.issue_refresh())
    }

    /// Jump to a page. The parameter changes immediately; result data
    /// changes only when the ticket is applied.
    pub fn set_page(&mut self, page: u32) -> Result<PendingRefresh, SyncError> {
        self.refresh_allowed()?;
        self.state.page = page.max(1);
        Ok(self.issue_refresh())
    }

    /// Advance one page; `Ok(None)` on the last page.
    pub fn next_page(&mut self) -> Result<Option<PendingRefresh>, SyncError> {
        self.refresh_allowed()?;
        if !self.state.has_next_page() {
            return Ok(None);
        }
        self.state.page += 1;
        Ok(Some(self.issue_refresh()))
    }

    /// Go back one page; `Ok(None)` on the first page.
    pub fn prev_page(&mut self) -> Result<Option<PendingRefresh>, SyncError> {
        self.refresh_allowed()?;
        if !self.state.has_prev_page() {
            return Ok(None);
        }
        self.state.page -= 1;
        Ok(Some(self.issue_refresh()))
    }

    /// Change the page size and jump back to page 1, the page-size
    /// selector's behavior.
    pub fn set_page_size(&mut self, page_size: u32) -> Result<PendingRefresh, SyncError> {
        self.refresh_allowed()?;
        self.state.page_size = page_size.max(1);
        self.state.page = 1;
        Ok(self.issue_refresh())
    }

    /// Change the search term, keeping the current page. A page left out of
    /// range by a narrower result set fails its refresh with the server's
    /// "Invalid page." detail and the previous results stay visible.
    pub fn set_search(&mut self, term: &str) -> Result<PendingRefresh, SyncError> {
        self.refresh_allowed()?;
        self.state.search = term.to_string();
        Ok(self.issue_refresh())
    }

    /// Reconcile a refresh outcome. A superseded ticket is discarded as
    /// [`Applied::Stale`] without touching any state, including
    /// `is_loading` — the newer refresh is still in flight.
    pub fn apply_refresh(
        &mut self,
        ticket: PendingRefresh,
        outcome: Result<HttpResponse, TransportError>,
    ) -> Result<Applied, SyncError> {
        if ticket.seq != self.latest_refresh {
            debug!(
                "discarding stale refresh seq={} (latest is {})",
                ticket.seq, self.latest_refresh
            );
            return Ok(Applied::Stale);
        }
        self.phase = Phase::Idle;
        self.state.is_loading = false;

        let parsed = outcome
            .map_err(|e| fetch_failed(&ticket.query, e.to_string()))
            .and_then(|response| {
                self.client
                    .parse_list(response)
                    .map_err(|e| fetch_failed(&ticket.query, e.detail()))
            });
        match parsed {
            Ok(page) => {
                debug!(
                    "applied refresh seq={}: {} of {} items",
                    ticket.seq,
                    page.results.len(),
                    page.count
                );
                self.state.items = page.results;
                self.state.total_count = page.count;
                Ok(Applied::Updated)
            }
            Err(err) => {
                warn!("refresh seq={} failed: {err}", ticket.seq);
                Err(err)
            }
        }
    }

    /// Submit the current draft: update when an edit target is set, create
    /// otherwise. A draft missing a required field is rejected here,
    /// without issuing any I/O.
    pub fn begin_submit(&mut self) -> Result<PendingSubmit, SyncError> {
        self.mutation_allowed()?;
        let draft = self.state.draft.clone();
        if let Some(field) = draft.missing_required_field() {
            let detail = Some(format!("{field} must not be empty"));
            return Err(match self.state.editing_id {
                Some(id) => SyncError::UpdateFailed { id, draft, detail },
                None => SyncError::CreateFailed { draft, detail },
            });
        }
        let target = self.state.editing_id;
        let request = match target {
            Some(id) => self
                .client
                .build_update(id, &draft)
                .map_err(|e| update_failed(id, &draft, e.detail()))?,
            None => self
                .client
                .build_create(&draft)
                .map_err(|e| create_failed(&draft, e.detail()))?,
        };
        self.phase = Phase::Mutating;
        self.state.is_loading = true;
        debug!("issued submit target={target:?}");
        Ok(PendingSubmit {
            target,
            draft,
            request,
        })
    }

    /// Reconcile a submit outcome. An edit replaces the matching item in
    /// place and finishes; a create resets to page 1 and hands back the
    /// follow-up refresh. On failure the draft and edit target survive so
    /// the form is not lost.
    pub fn apply_submit(
        &mut self,
        ticket: PendingSubmit,
        outcome: Result<HttpResponse, TransportError>,
    ) -> Result<SubmitApplied, SyncError> {
        match ticket.target {
            Some(id) => {
                let parsed = outcome
                    .map_err(|e| update_failed(id, &ticket.draft, e.to_string()))
                    .and_then(|response| {
                        self.client
                            .parse_update(response)
                            .map_err(|e| update_failed(id, &ticket.draft, e.detail()))
                    });
                self.phase = Phase::Idle;
                self.state.is_loading = false;
                match parsed {
                    Ok(item) => {
                        // The edited item may have paged off screen; the
                        // write still succeeded, so the edit completes.
                        if let Some(slot) =
                            self.state.items.iter_mut().find(|i| i.id == item.id)
                        {
                            *slot = item.clone();
                        }
                        self.state.editing_id = None;
                        self.state.draft.clear();
                        debug!("applied update id={id}");
                        Ok(SubmitApplied::Edited(item))
                    }
                    Err(err) => {
                        warn!("update id={id} failed: {err}");
                        Err(err)
                    }
                }
            }
            None => {
                let parsed = outcome
                    .map_err(|e| create_failed(&ticket.draft, e.to_string()))
                    .and_then(|response| {
                        self.client
                            .parse_create(response)
                            .map_err(|e| create_failed(&ticket.draft, e.detail()))
                    });
                match parsed {
                    Ok(item) => {
                        // The new item's position in pagination order is
                        // unknown here, so go back to page 1 and re-fetch.
                        self.state.page = 1;
                        self.state.draft.clear();
                        debug!("applied create id={}", item.id);
                        let refresh = self.issue_refresh();
                        Ok(SubmitApplied::Created { item, refresh })
                    }
                    Err(err) => {
                        self.phase = Phase::Idle;
                        self.state.is_loading = false;
                        warn!("create failed: {err}");
                        Err(err)
                    }
                }
            }
        }
    }

    /// Delete an item. Confirmation of destructive intent is the caller's
    /// responsibility and must happen before this is invoked.
    pub fn begin_remove(&mut self, id: u64) -> Result<PendingRemove, SyncError> {
        self.mutation_allowed()?;
        let request = self.client.build_delete(id);
        self.phase = Phase::Mutating;
        self.state.is_loading = true;
        debug!("issued remove id={id}");
        Ok(PendingRemove { id, request })
    }

    /// Reconcile a delete outcome. On success the page rolls back by one
    /// if the deleted item was the only one on a page past the first, so
    /// the follow-up refresh never lands on an empty trailing page.
    pub fn apply_remove(
        &mut self,
        ticket: PendingRemove,
        outcome: Result<HttpResponse, TransportError>,
    ) -> Result<PendingRefresh, SyncError> {
        let parsed = outcome
            .map_err(|e| delete_failed(ticket.id, e.to_string()))
            .and_then(|response| {
                self.client
                    .parse_delete(response)
                    .map_err(|e| delete_failed(ticket.id, e.detail()))
            });
        match parsed {
            Ok(()) => {
                if self.state.items.len() == 1 && self.state.page > 1 {
                    self.state.page -= 1;
                    debug!("page emptied by remove, rolling back to {}", self.state.page);
                }
                debug!("applied remove id={}", ticket.id);
                Ok(self.issue_refresh())
            }
            Err(err) => {
                self.phase = Phase::Idle;
                self.state.is_loading = false;
                warn!("remove id={} failed: {err}", ticket.id);
                Err(err)
            }
        }
    }

    /// Refreshes supersede an in-flight refresh but never interleave with
    /// a mutation.
    fn refresh_allowed(&self) -> Result<(), SyncError> {
        match self.phase {
            Phase::Mutating => Err(SyncError::Busy(InFlight::Mutation)),
            Phase::Idle | Phase::Refreshing => Ok(()),
        }
    }

    /// Mutations start only from idle.
    fn mutation_allowed(&self) -> Result<(), SyncError> {
        match self.phase {
            Phase::Idle => Ok(()),
            Phase::Refreshing => Err(SyncError::Busy(InFlight::Refresh)),
            Phase::Mutating => Err(SyncError::Busy(InFlight::Mutation)),
        }
    }

    fn issue_refresh(&mut self) -> PendingRefresh {
        self.next_seq += 1;
        self.latest_refresh = self.next_seq;
        let query = ListQuery {
            page: self.state.page,
            page_size: self.state.page_size,
            search: self.state.search.clone(),
        };
        let request = self.client.build_list(&query);
        self.phase = Phase::Refreshing;
        self.state.is_loading = true;
        debug!(
            "issued refresh seq={} page={} page_size={} search={:?}",
            self.next_seq, query.page, query.page_size, query.search
        );
        PendingRefresh {
            seq: self.next_seq,
            query,
            request,
        }
    }
}

fn fetch_failed(query: &ListQuery, detail: String) -> SyncError {
    SyncError::FetchFailed {
        query: query.clone(),
        detail: Some(detail),
    }
}

fn create_failed(draft: &ItemDraft, detail: String) -> SyncError {
    SyncError::CreateFailed {
        draft: draft.clone(),
        detail: Some(detail),
    }
}

fn update_failed(id: u64, draft: &ItemDraft, detail: String) -> SyncError {
    SyncError::UpdateFailed {
        id,
        draft: draft.clone(),
        detail: Some(detail),
    }
}

fn delete_failed(id: u64, detail: String) -> SyncError {
    SyncError::DeleteFailed {
        id,
        detail: Some(detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiConfig;
    use serde_json::json;

    fn controller() -> ListSyncController {
        ListSyncController::new(ItemsClient::new(ApiConfig::new("http://test/api")))
    }

    fn item_json(id: u64, name: &str, category: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "category": category,
            "description": "",
            "created_at": "2024-05-01T10:00:00Z",
        })
    }

    fn page_response(count: u64, items: Vec<serde_json::Value>) -> HttpResponse {
        let body = json!({
            "count": count,
            "next": null,
            "previous": null,
            "results": items,
        });
        HttpResponse::new(200, body.to_string())
    }

    /// Controller with `count` total items and the given page applied.
    fn seeded(page: u32, count: u64, items: Vec<serde_json::Value>) -> ListSyncController {
        let mut c = controller();
        let ticket = c.set_page(page).unwrap();
        c.apply_refresh(ticket, Ok(page_response(count, items)))
            .unwrap();
        c
    }

    #[test]
    fn refresh_replaces_items_and_count() {
        let mut c = controller();
        let ticket = c.refresh().unwrap();
        assert!(c.state().is_loading);
        assert_eq!(c.in_flight(), Some(InFlight::Refresh));

        let response = page_response(25, vec![item_json(1, "a", "A"), item_json(2, "b", "B")]);
        let applied = c.apply_refresh(ticket, Ok(response)).unwrap();
        assert_eq!(applied, Applied::Updated);
        assert_eq!(c.state().items.len(), 2);
        assert_eq!(c.state().total_count, 25);
        assert!(!c.state().is_loading);
        assert_eq!(c.in_flight(), None);
    }

    #[test]
    fn refresh_failure_leaves_previous_results() {
        let mut c = seeded(1, 1, vec![item_json(1, "a", "A")]);
        let ticket = c.set_page(9).unwrap();
        let err = c
            .apply_refresh(ticket, Ok(HttpResponse::new(404, r#"{"detail":"Invalid page."}"#)))
            .unwrap_err();
        assert!(matches!(err, SyncError::FetchFailed { .. }));
        assert_eq!(err.detail(), Some("Invalid page."));
        // Previous results stay visible; only the page parameter moved.
        assert_eq!(c.state().items.len(), 1);
        assert_eq!(c.state().total_count, 1);
        assert!(!c.state().is_loading);
    }

    #[test]
    fn transport_failure_becomes_fetch_failed() {
        let mut c = controller();
        let ticket = c.refresh().unwrap();
        let err = c
            .apply_refresh(ticket, Err(TransportError("connection refused".to_string())))
            .unwrap_err();
        match err {
            SyncError::FetchFailed { detail, .. } => {
                assert!(detail.unwrap().contains("connection refused"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!c.state().is_loading);
    }

    #[test]
    fn stale_refresh_arriving_late_is_discarded() {
        let mut c = controller();
        let first = c.refresh().unwrap();
        let second = c.set_page(2).unwrap();
        assert_eq!(second.query().page, 2);

        // Newer response lands first.
        let applied = c
            .apply_refresh(second, Ok(page_response(25, vec![item_json(11, "k", "K")])))
            .unwrap();
        assert_eq!(applied, Applied::Updated);
        assert!(!c.state().is_loading);

        // Then the superseded one; nothing may change.
        let applied = c
            .apply_refresh(first, Ok(page_response(25, vec![item_json(1, "a", "A")])))
            .unwrap();
        assert_eq!(applied, Applied::Stale);
        assert_eq!(c.state().page, 2);
        assert_eq!(c.state().items[0].id, 11);
        assert!(!c.state().is_loading);
    }

    #[test]
    fn stale_refresh_arriving_early_is_discarded() {
        let mut c = controller();
        let first = c.refresh().unwrap();
        let second = c.set_page(2).unwrap();

        let applied = c
            .apply_refresh(first, Ok(page_response(25, vec![item_json(1, "a", "A")])))
            .unwrap();
        assert_eq!(applied, Applied::Stale);
        // The newer refresh is still in flight.
        assert!(c.state().is_loading);
        assert!(c.state().items.is_empty());

        let applied = c
            .apply_refresh(second, Ok(page_response(25, vec![item_json(11, "k", "K")])))
            .unwrap();
        assert_eq!(applied, Applied::Updated);
        assert_eq!(c.state().items[0].id, 11);
        assert!(!c.state().is_loading);
    }

    #[test]
    fn stale_failure_is_discarded_too() {
        let mut c = controller();
        let first = c.refresh().unwrap();
        let second = c.set_page(2).unwrap();
        let applied = c
            .apply_refresh(first, Err(TransportError("timed out".to_string())))
            .unwrap();
        assert_eq!(applied, Applied::Stale);
        c.apply_refresh(second, Ok(page_response(0, vec![]))).unwrap();
        assert!(!c.state().is_loading);
    }

    #[test]
    fn mutations_are_rejected_while_a_refresh_is_in_flight() {
        let mut c = controller();
        let _ticket = c.refresh().unwrap();
        assert!(matches!(
            c.begin_submit().unwrap_err(),
            SyncError::Busy(InFlight::Refresh)
        ));
        assert!(matches!(
            c.begin_remove(1).unwrap_err(),
            SyncError::Busy(InFlight::Refresh)
        ));
    }

    #[test]
    fn refreshes_are_rejected_while_a_mutation_is_in_flight() {
        let mut c = controller();
        c.draft_mut().name = "Hammer".to_string();
        c.draft_mut().category = "Tools".to_string();
        let _ticket = c.begin_submit().unwrap();
        assert!(matches!(
            c.refresh().unwrap_err(),
            SyncError::Busy(InFlight::Mutation)
        ));
        assert!(matches!(
            c.begin_remove(1).unwrap_err(),
            SyncError::Busy(InFlight::Mutation)
        ));
    }

    #[test]
    fn submit_rejects_a_draft_missing_required_fields() {
        let mut c = controller();
        c.draft_mut().name = "Hammer".to_string();
        let err = c.begin_submit().unwrap_err();
        match err {
            SyncError::CreateFailed { detail, .. } => {
                assert_eq!(detail.as_deref(), Some("category must not be empty"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Rejected before any I/O: still idle, draft intact.
        assert_eq!(c.in_flight(), None);
        assert!(!c.state().is_loading);
        assert_eq!(c.state().draft.name, "Hammer");
    }

    #[test]
    fn create_resets_to_page_one_and_hands_back_a_refresh() {
        let mut c = seeded(3, 25, vec![item_json(21, "x", "X")]);
        c.draft_mut().name = "Hammer".to_string();
        c.draft_mut().category = "Tools".to_string();

        let ticket = c.begin_submit().unwrap();
        assert_eq!(c.in_flight(), Some(InFlight::Mutation));
        let created = HttpResponse::new(201, item_json(26, "Hammer", "Tools").to_string());
        match c.apply_submit(ticket, Ok(created)).unwrap() {
            SubmitApplied::Created { item, refresh } => {
                assert_eq!(item.id, 26);
                assert_eq!(refresh.query().page, 1);
                // The compound operation is still loading until the
                // follow-up refresh settles.
                assert!(c.state().is_loading);
                assert_eq!(c.state().page, 1);
                assert_eq!(c.state().draft, ItemDraft::default());
                c.apply_refresh(
                    refresh,
                    Ok(page_response(26, vec![item_json(1, "a", "A")])),
                )
                .unwrap();
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!c.state().is_loading);
        assert_eq!(c.state().total_count, 26);
    }

    #[test]
    fn create_failure_preserves_the_draft() {
        let mut c = controller();
        c.draft_mut().name = "Hammer".to_string();
        c.draft_mut().category = "Tools".to_string();
        let ticket = c.begin_submit().unwrap();
        let response = HttpResponse::new(400, r#"{"name":["This field may not be blank."]}"#);
        let err = c.apply_submit(ticket, Ok(response)).unwrap_err();
        assert!(matches!(err, SyncError::CreateFailed { .. }));
        assert_eq!(c.state().draft.name, "Hammer");
        assert!(!c.state().is_loading);
        assert_eq!(c.in_flight(), None);
    }

    #[test]
    fn update_replaces_the_item_in_place_without_a_refresh() {
        let mut c = seeded(
            1,
            3,
            vec![
                item_json(1, "a", "A"),
                item_json(2, "b", "B"),
                item_json(3, "c", "C"),
            ],
        );
        assert!(c.begin_edit(2));
        assert_eq!(c.state().editing_id, Some(2));
        assert_eq!(c.state().draft.name, "b");

        c.draft_mut().name = "b2".to_string();
        let ticket = c.begin_submit().unwrap();
        let response = HttpResponse::new(200, item_json(2, "b2", "B").to_string());
        match c.apply_submit(ticket, Ok(response)).unwrap() {
            SubmitApplied::Edited(item) => assert_eq!(item.name, "b2"),
            other => panic!("unexpected outcome: {other:?}"),
        }

        // Same position, new fields, edit state cleared, no refresh.
        let ids: Vec<u64> = c.state().items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(c.state().items[1].name, "b2");
        assert_eq!(c.state().editing_id, None);
        assert_eq!(c.state().draft, ItemDraft::default());
        assert_eq!(c.in_flight(), None);
        assert!(!c.state().is_loading);
    }

    #[test]
    fn update_failure_preserves_draft_and_edit_target() {
        let mut c = seeded(1, 1, vec![item_json(2, "b", "B")]);
        assert!(c.begin_edit(2));
        c.draft_mut().name = "b2".to_string();
        let ticket = c.begin_submit().unwrap();
        let err = c
            .apply_submit(ticket, Ok(HttpResponse::new(500, "internal error")))
            .unwrap_err();
        match err {
            SyncError::UpdateFailed { id, ref draft, .. } => {
                assert_eq!(id, 2);
                assert_eq!(draft.name, "b2");
            }
            ref other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(c.state().editing_id, Some(2));
        assert_eq!(c.state().draft.name, "b2");
        assert_eq!(c.state().items[0].name, "b");
    }

    #[test]
    fn begin_edit_requires_the_item_on_the_current_page() {
        let mut c = seeded(1, 1, vec![item_json(1, "a", "A")]);
        assert!(!c.begin_edit(99));
        assert_eq!(c.state().editing_id, None);
    }

    #[test]
    fn cancel_edit_resets_the_form() {
        let mut c = seeded(1, 1, vec![item_json(1, "a", "A")]);
        assert!(c.begin_edit(1));
        c.cancel_edit();
        assert_eq!(c.state().editing_id, None);
        assert_eq!(c.state().draft, ItemDraft::default());
    }

    #[test]
    fn remove_rolls_back_when_the_page_held_one_item() {
        // 11 items of 10 per page: page 2 holds exactly one.
        let mut c = seeded(2, 11, vec![item_json(11, "k", "K")]);
        let ticket = c.begin_remove(11).unwrap();
        let refresh = c
            .apply_remove(ticket, Ok(HttpResponse::new(204, "")))
            .unwrap();
        assert_eq!(c.state().page, 1);
        assert_eq!(refresh.query().page, 1);
        assert!(c.state().is_loading);
        c.apply_refresh(refresh, Ok(page_response(10, vec![item_json(1, "a", "A")])))
            .unwrap();
        assert!(!c.state().is_loading);
    }

    #[test]
    fn remove_keeps_the_page_when_items_remain() {
        let mut c = seeded(2, 12, vec![item_json(11, "k", "K"), item_json(12, "l", "L")]);
        let ticket = c.begin_remove(11).unwrap();
        let refresh = c
            .apply_remove(ticket, Ok(HttpResponse::new(204, "")))
            .unwrap();
        assert_eq!(c.state().page, 2);
        assert_eq!(refresh.query().page, 2);
    }

    #[test]
    fn remove_does_not_roll_back_below_page_one() {
        let mut c = seeded(1, 1, vec![item_json(1, "a", "A")]);
        let ticket = c.begin_remove(1).unwrap();
        let refresh = c
            .apply_remove(ticket, Ok(HttpResponse::new(204, "")))
            .unwrap();
        assert_eq!(refresh.query().page, 1);
    }

    #[test]
    fn remove_failure_leaves_state_unchanged() {
        let mut c = seeded(2, 11, vec![item_json(11, "k", "K")]);
        let ticket = c.begin_remove(11).unwrap();
        let response = HttpResponse::new(404, r#"{"detail":"No Item matches the given query."}"#);
        let err = c.apply_remove(ticket, Ok(response)).unwrap_err();
        assert!(matches!(err, SyncError::DeleteFailed { id: 11, .. }));
        assert_eq!(c.state().page, 2);
        assert_eq!(c.state().items.len(), 1);
        assert!(!c.state().is_loading);
    }

    #[test]
    fn next_page_stops_at_the_boundary() {
        let mut c = seeded(3, 25, vec![item_json(21, "x", "X")]);
        // 3 * 10 >= 25, no further page.
        assert!(c.next_page().unwrap().is_none());
        assert_eq!(c.state().page, 3);
    }

    #[test]
    fn prev_page_stops_at_page_one() {
        let mut c = seeded(1, 25, vec![item_json(1, "a", "A")]);
        assert!(c.prev_page().unwrap().is_none());
        assert_eq!(c.state().page, 1);
    }

    #[test]
    fn set_page_size_resets_to_page_one() {
        let mut c = seeded(3, 25, vec![item_json(21, "x", "X")]);
        let ticket = c.set_page_size(25).unwrap();
        assert_eq!(ticket.query().page, 1);
        assert_eq!(ticket.query().page_size, 25);
        assert_eq!(c.state().page, 1);
    }

    #[test]
    fn set_search_keeps_the_current_page() {
        let mut c = seeded(2, 25, vec![item_json(11, "k", "K")]);
        let ticket = c.set_search("hammer").unwrap();
        assert_eq!(ticket.query().page, 2);
        assert_eq!(ticket.query().search, "hammer");
    }

    #[test]
    fn refresh_is_idempotent_against_an_unchanged_backend() {
        let response = || page_response(2, vec![item_json(1, "a", "A"), item_json(2, "b", "B")]);
        let mut c = controller();
        let ticket = c.refresh().unwrap();
        c.apply_refresh(ticket, Ok(response())).unwrap();
        let first = c.state().clone();

        let ticket = c.refresh().unwrap();
        c.apply_refresh(ticket, Ok(response())).unwrap();
        assert_eq!(*c.state(), first);
    }
}

//! Couples a controller to a transport and runs operations to completion.
//!
//! # Design
//! The controller hands out tickets and never touches the network;
//! `SyncSession` is the host that executes each ticket over a
//! [`Transport`] and feeds the outcome back, including the follow-up
//! refreshes a create or delete produces. Confirmation of destructive
//! intent is an injected [`ConfirmDelete`] capability rather than a
//! blocking dialog, so the whole flow runs without a UI environment.

use crate::client::ItemsClient;
use crate::controller::{Applied, ListSyncController, PendingRefresh, SubmitApplied};
use crate::error::SyncError;
use crate::transport::Transport;
use crate::types::{Item, ViewState};

/// Decides whether a delete proceeds. Called once, before any request is
/// issued; returning false cancels the operation without touching state.
pub trait ConfirmDelete {
    fn confirm(&self, item: &Item) -> bool;
}

impl<F> ConfirmDelete for F
where
    F: Fn(&Item) -> bool,
{
    fn confirm(&self, item: &Item) -> bool {
        self(item)
    }
}

/// Confirms every delete; for hosts that ask the user elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct AlwaysConfirm;

impl ConfirmDelete for AlwaysConfirm {
    fn confirm(&self, _item: &Item) -> bool {
        true
    }
}

/// How a submit completed, for distinct success notifications.
#[derive(Debug)]
pub enum SubmitOutcome {
    Created(Item),
    Updated(Item),
}

/// How a remove completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Deleted,
    /// The confirmation capability declined; nothing was issued.
    Cancelled,
}

/// Drives a [`ListSyncController`] over a transport, one operation at a
/// time. Each method runs its whole compound operation — request,
/// reconcile, any follow-up refresh — before returning.
pub struct SyncSession<T, C> {
    controller: ListSyncController,
    transport: T,
    confirm: C,
}

impl<T: Transport, C: ConfirmDelete> SyncSession<T, C> {
    pub fn new(client: ItemsClient, transport: T, confirm: C) -> Self {
        Self {
            controller: ListSyncController::new(client),
            transport,
            confirm,
        }
    }

    pub fn state(&self) -> &ViewState {
        self.controller.state()
    }

    /// Direct access for draft keystrokes and edit targeting.
    pub fn controller_mut(&mut self) -> &mut ListSyncController {
        &mut self.controller
    }

    /// Load the list with the current parameters.
    pub fn refresh(&mut self) -> Result<(), SyncError> {
        let ticket = self.controller.refresh()?;
        self.run_refresh(ticket)
    }

    pub fn set_page(&mut self, page: u32) -> Result<(), SyncError> {
        let ticket = self.controller.set_page(page)?;
        self.run_refresh(ticket)
    }

    /// Returns false when already on the last page.
    pub fn next_page(&mut self) -> Result<bool, SyncError> {
        match self.controller.next_page()? {
            Some(ticket) => self.run_refresh(ticket).map(|()| true),
            None => Ok(false),
        }
    }

    /// Returns false when already on the first page.
    pub fn prev_page(&mut self) -> Result<bool, SyncError> {
        match self.controller.prev_page()? {
            Some(ticket) => self.run_refresh(ticket).map(|()| true),
            None => Ok(false),
        }
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Result<(), SyncError> {
        let ticket = self.controller.set_page_size(page_size)?;
        self.run_refresh(ticket)
    }

    pub fn set_search(&mut self, term: &str) -> Result<(), SyncError> {
        let ticket = self.controller.set_search(term)?;
        self.run_refresh(ticket)
    }

    /// Submit the current draft; a create also runs the follow-up refresh
    /// back on page 1.
    pub fn submit(&mut self) -> Result<SubmitOutcome, SyncError> {
        let ticket = self.controller.begin_submit()?;
        let outcome = self.transport.execute(ticket.request());
        match self.controller.apply_submit(ticket, outcome)? {
            SubmitApplied::Edited(item) => Ok(SubmitOutcome::Updated(item)),
            SubmitApplied::Created { item, refresh } => {
                self.run_refresh(refresh)?;
                Ok(SubmitOutcome::Created(item))
            }
        }
    }

    /// Confirm, delete, and refresh at the page the rollback rule picks.
    /// The id must be on the current page — that is where delete controls
    /// come from.
    pub fn remove(&mut self, id: u64) -> Result<RemoveOutcome, SyncError> {
        let item = self
            .state()
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or(SyncError::DeleteFailed {
                id,
                detail: Some("item is not on the current page".to_string()),
            })?;
        if !self.confirm.confirm(&item) {
            return Ok(RemoveOutcome::Cancelled);
        }
        let ticket = self.controller.begin_remove(id)?;
        let outcome = self.transport.execute(ticket.request());
        let refresh = self.controller.apply_remove(ticket, outcome)?;
        self.run_refresh(refresh)?;
        Ok(RemoveOutcome::Deleted)
    }

    /// Sessions run one ticket at a time, so supersession cannot occur
    /// here; `Stale` is unreachable but tolerated.
    fn run_refresh(&mut self, ticket: PendingRefresh) -> Result<(), SyncError> {
        let outcome = self.transport.execute(ticket.request());
        match self.controller.apply_refresh(ticket, outcome)? {
            Applied::Updated | Applied::Stale => Ok(()),
        }
    }
}

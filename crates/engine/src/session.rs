//! Edit session state.
//!
//! One entry per cell with an open editor, so two cells can be edited (or
//! committed) independently. The phase of an entry is the commit guard:
//! only `Editing` and `Failed` cells accept a commit trigger, which makes a
//! focus-loss arriving right after Enter a no-op.
//!
//! The pending override set through `set` is one-shot: the first editor
//! opened for the matching field takes it, and it is gone afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use celledit_core::{CellRef, FieldDescriptor, RowId};

use crate::events::Interaction;
use crate::transport::RequestId;

/// Where a cell is in its edit lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellPhase {
    /// Editor mounted, waiting for Enter or focus-loss
    Editing,
    /// Request in flight, control disabled
    Committing,
    /// Last request failed in transport; editable again
    Failed,
}

impl CellPhase {
    /// True if a commit trigger is accepted in this phase.
    pub fn accepts_commit(&self) -> bool {
        matches!(self, CellPhase::Editing | CellPhase::Failed)
    }
}

/// Context of one commit, kept until its request completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub cell: CellRef,
    pub row: Option<RowId>,
    pub field: String,
    pub raw: String,
    pub coerced: String,
    pub interaction: Interaction,
}

/// State of one open editor.
#[derive(Debug, Clone)]
pub struct CellSession {
    pub field: Arc<FieldDescriptor>,
    /// Display text captured when the editor opened
    pub original: String,
    pub phase: CellPhase,
    /// Request this cell is waiting for
    pub request: Option<RequestId>,
}

/// Value set through `set`, waiting for its field to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOverride {
    pub field: String,
    pub value: String,
}

/// All transient edit state, owned by the controller.
#[derive(Debug, Default)]
pub struct EditSession {
    active: Option<CellRef>,
    previous: Option<CellRef>,
    cells: HashMap<CellRef, CellSession>,
    in_flight: HashMap<RequestId, PendingRequest>,
    pending_override: Option<PendingOverride>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a click on `cell`: the active cell becomes the previous one.
    pub fn focus_cell(&mut self, cell: CellRef) {
        if let Some(active) = self.active {
            self.previous = Some(active);
        }
        self.active = Some(cell);
    }

    /// Most recently clicked cell.
    pub fn active(&self) -> Option<CellRef> {
        self.active
    }

    /// Cell clicked before the active one. Informational only.
    pub fn previous(&self) -> Option<CellRef> {
        self.previous
    }

    // ---- override ----

    /// Replace the pending override.
    pub fn set_override(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.pending_override = Some(PendingOverride {
            field: field.into(),
            value: value.into(),
        });
    }

    pub fn pending_override(&self) -> Option<&PendingOverride> {
        self.pending_override.as_ref()
    }

    /// Consume the override if it targets `field`; otherwise leave it pending.
    pub fn take_override(&mut self, field: &str) -> Option<String> {
        match &self.pending_override {
            Some(pending) if pending.field == field => {
                self.pending_override.take().map(|pending| pending.value)
            }
            _ => None,
        }
    }

    // ---- per-cell state ----

    /// Start editing `cell`, replacing any previous entry for it.
    pub fn open(&mut self, cell: CellRef, field: Arc<FieldDescriptor>, original: String) {
        self.cells.insert(
            cell,
            CellSession {
                field,
                original,
                phase: CellPhase::Editing,
                request: None,
            },
        );
    }

    pub fn get(&self, cell: CellRef) -> Option<&CellSession> {
        self.cells.get(&cell)
    }

    pub fn phase(&self, cell: CellRef) -> Option<CellPhase> {
        self.cells.get(&cell).map(|s| s.phase)
    }

    /// Cells with an open editor.
    pub fn open_cells(&self) -> Vec<CellRef> {
        let mut cells: Vec<CellRef> = self.cells.keys().copied().collect();
        cells.sort();
        cells
    }

    /// Guarded `Editing|Failed → Committing`. Returns the captured original
    /// value, or `None` if the cell is not open or already committing.
    pub fn begin_commit(&mut self, cell: CellRef) -> Option<String> {
        let session = self.cells.get_mut(&cell)?;
        if !session.phase.accepts_commit() {
            return None;
        }
        session.phase = CellPhase::Committing;
        Some(session.original.clone())
    }

    /// Remember the request a committing cell waits for.
    pub fn attach_request(&mut self, id: RequestId, pending: PendingRequest) {
        if let Some(session) = self.cells.get_mut(&pending.cell) {
            session.request = Some(id);
        }
        self.in_flight.insert(id, pending);
    }

    /// Take the context of a completed request.
    pub fn take_request(&mut self, id: RequestId) -> Option<PendingRequest> {
        self.in_flight.remove(&id)
    }

    /// True if `cell` is still waiting for exactly this request.
    pub fn awaits(&self, cell: CellRef, id: RequestId) -> bool {
        self.cells
            .get(&cell)
            .is_some_and(|s| s.phase == CellPhase::Committing && s.request == Some(id))
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Back to an editable phase after a rejected or failed commit.
    pub fn resume(&mut self, cell: CellRef, phase: CellPhase) {
        if let Some(session) = self.cells.get_mut(&cell) {
            session.phase = phase;
            session.request = None;
        }
    }

    /// End the edit of `cell`.
    pub fn close(&mut self, cell: CellRef) -> Option<CellSession> {
        self.cells.remove(&cell)
    }

    /// End the edit of `cell` unless a request is in flight for it.
    pub fn discard_if_idle(&mut self, cell: CellRef) -> bool {
        match self.cells.get(&cell) {
            Some(session) if session.phase != CellPhase::Committing => {
                self.cells.remove(&cell);
                true
            }
            _ => false,
        }
    }
}

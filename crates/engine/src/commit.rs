//! Commit pipeline.
//!
//! Dirty-check, coercion, persist, reconcile. A commit starts from a mounted
//! control and ends in exactly one of:
//!
//! - unchanged value: written back as text, no request;
//! - nowhere to persist (no `url`/`data`, or no row id): original text restored;
//! - request dispatched: the cell stays `Committing` until its completion is
//!   fed back through `LifecycleController::complete`.
//!
//! `cell.postEdit` closes every branch. For dispatched requests it is emitted
//! when the completion is handled.

use celledit_core::{CellRef, FieldType};
use celledit_protocol::{EditPayload, EditResponse, PersistRequest};

use crate::controller::LifecycleController;
use crate::events::{EditEvent, Interaction, RowChanged};
use crate::grid::{ErrorBlock, Grid};
use crate::session::{CellPhase, PendingRequest};
use crate::transport::{Completion, RequestId, Transport, TransportError};

/// Value sent for a raw control value of the given field type.
pub fn coerce(field_type: Option<FieldType>, raw: &str) -> String {
    match field_type {
        Some(FieldType::Numeric) => coerce_numeric(raw),
        Some(FieldType::Checkbox) => if is_truthy(raw) { "1" } else { "0" }.to_string(),
        _ => raw.to_string(),
    }
}

/// Accept a decimal comma: the first `,` becomes `.` when that yields a
/// number. Anything else is sent as typed.
pub fn coerce_numeric(raw: &str) -> String {
    let candidate = raw.replacen(',', ".", 1);
    match candidate.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => candidate,
        _ => raw.to_string(),
    }
}

/// Empty, `0`, `false` and `off` are false; everything else is true.
pub fn is_truthy(raw: &str) -> bool {
    let raw = raw.trim();
    !(raw.is_empty()
        || raw == "0"
        || raw.eq_ignore_ascii_case("false")
        || raw.eq_ignore_ascii_case("off"))
}

impl<T: Transport> LifecycleController<T> {
    /// Commit the editor in `cell`. Returns false when the trigger was
    /// ignored (no control, or the cell is already committing).
    pub(crate) fn commit<G: Grid>(
        &mut self,
        grid: &mut G,
        cell: CellRef,
        interaction: Interaction,
    ) -> bool {
        let raw = match grid.control(cell) {
            Some(control) => control.value(),
            None => return false,
        };
        let Some(original) = self.session.begin_commit(cell) else {
            return false;
        };
        let field = match self.session.get(cell) {
            Some(session) => session.field.clone(),
            None => return false,
        };

        self.bus.trigger(&EditEvent::CellPreEdit {
            interaction: interaction.clone(),
            cell,
        });

        let coerced = coerce(Some(field.field_type), &raw);
        if let Some(control) = grid.control_mut(cell) {
            control.set_enabled(false);
        }

        let pending = PendingRequest {
            cell,
            row: grid.row_id(cell),
            field: field.name.clone(),
            raw,
            coerced,
            interaction,
        };

        if pending.raw == original {
            log::debug!("{} unchanged, closing editor", cell);
            let value = self.resolve_final_value(grid, &pending);
            grid.write_text(cell, &value);
            self.session.close(cell);
            self.emit_post_edit(&pending);
            return true;
        }

        let Some(row) = pending.row else {
            log::warn!("Row of {} has no usable data-id; edit of '{}' not saved", cell, pending.field);
            self.cancel(grid, &pending, &original);
            return true;
        };
        let Some((url, template)) = self.options.persist_target() else {
            log::warn!("No url/data configured; edit of '{}' not saved", pending.field);
            self.cancel(grid, &pending, &original);
            return true;
        };

        let request = PersistRequest::new(
            url,
            self.options.effective_method(),
            EditPayload::build(template, row, &pending.field, &pending.coerced),
        );
        let id = self.transport.send(request);
        log::debug!("Dispatched {} for {} ({} = {:?})", id, cell, pending.field, pending.coerced);
        self.session.attach_request(id, pending);
        true
    }

    /// Feed one request outcome into the pipeline.
    pub fn complete<G: Grid>(&mut self, grid: &mut G, completion: Completion) {
        let Some(pending) = self.session.take_request(completion.id) else {
            log::debug!("Ignoring completion {} with no pending request", completion.id);
            return;
        };
        if !self.session.awaits(pending.cell, completion.id) {
            log::debug!("Ignoring stale completion {} for {}", completion.id, pending.cell);
            return;
        }

        match completion.result {
            Ok(response) if response.has_field_errors() => {
                self.show_field_errors(grid, &pending, &response)
            }
            Ok(_) => self.reconcile(grid, &pending),
            Err(err) => self.fail(grid, completion.id, &pending, &err),
        }
    }

    /// Server accepted the value: write the final text and close the editor.
    fn reconcile<G: Grid>(&mut self, grid: &mut G, pending: &PendingRequest) {
        let value = self.resolve_final_value(grid, pending);
        grid.write_text(pending.cell, &value);
        self.session.close(pending.cell);
        log::debug!("Saved {} as {:?}", pending.cell, value);

        self.bus.trigger(&EditEvent::CellCompleteEdit {
            interaction: pending.interaction.clone(),
            cell: pending.cell,
        });
        self.emit_post_edit(pending);
    }

    /// Server rejected the value: show the messages, keep the editor.
    fn show_field_errors<G: Grid>(
        &mut self,
        grid: &mut G,
        pending: &PendingRequest,
        response: &EditResponse,
    ) {
        if self.reopen(grid, pending.cell, CellPhase::Editing) {
            grid.set_error_block(pending.cell, None);
            grid.set_error_block(pending.cell, Some(ErrorBlock::new(response.error_messages())));
        }
        self.emit_post_edit(pending);
    }

    /// Transport failed: keep the edited value so Enter or focus-loss retries.
    fn fail<G: Grid>(
        &mut self,
        grid: &mut G,
        id: RequestId,
        pending: &PendingRequest,
        err: &TransportError,
    ) {
        log::error!("Request {} saving '{}' of {} failed: {}", id, pending.field, pending.cell, err);
        self.reopen(grid, pending.cell, CellPhase::Failed);
        self.emit_post_edit(pending);
    }

    /// Nothing to persist to: put the original text back.
    fn cancel<G: Grid>(&mut self, grid: &mut G, pending: &PendingRequest, original: &str) {
        grid.write_text(pending.cell, original);
        self.session.close(pending.cell);
        self.emit_post_edit(pending);
    }

    /// Re-enable the control of `cell` and return true. A cell whose control
    /// was collapsed meanwhile has nothing left to edit: its original text is
    /// restored and the session closed.
    fn reopen<G: Grid>(&mut self, grid: &mut G, cell: CellRef, phase: CellPhase) -> bool {
        if let Some(control) = grid.control_mut(cell) {
            control.set_enabled(true);
            self.session.resume(cell, phase);
            return true;
        }

        if let Some(session) = self.session.get(cell) {
            let original = session.original.clone();
            log::debug!("{} was collapsed while saving; restoring {:?}", cell, original);
            grid.write_text(cell, &original);
        }
        self.session.close(cell);
        false
    }

    /// `row.changed` override when the row exists and a hook answers,
    /// otherwise the coerced value.
    fn resolve_final_value<G: Grid>(&mut self, grid: &G, pending: &PendingRequest) -> String {
        let row_data = pending.row.and_then(|row| grid.row_data(row));
        let Some(row_data) = row_data else {
            return pending.coerced.clone();
        };

        let event = EditEvent::RowChanged(RowChanged {
            interaction: pending.interaction.clone(),
            cell: pending.cell,
            table_cell: self.session.active(),
            value: pending.raw.clone(),
            row_data,
            field: pending.field.clone(),
            previous_cell: self.session.previous(),
        });
        self.bus
            .trigger(&event)
            .unwrap_or_else(|| pending.coerced.clone())
    }

    fn emit_post_edit(&mut self, pending: &PendingRequest) {
        self.bus.trigger(&EditEvent::CellPostEdit {
            interaction: pending.interaction.clone(),
            cell: pending.cell,
            value: pending.raw.clone(),
        });
    }
}

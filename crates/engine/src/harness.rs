//! Test harness for edit lifecycles.
//!
//! `EditHarness` wraps a `LifecycleController` over a `MemoryGrid` with a
//! `RecordingTransport`, and collects every emitted event. Requests never
//! leave the process: tests resolve them explicitly and then pump.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use celledit_config::EditorOptions;
use celledit_core::{CellRef, FieldDescriptor, SelectOption};
use celledit_protocol::{EditResponse, PersistRequest};

use crate::controller::LifecycleController;
use crate::events::EventCollector;
use crate::grid::Grid;
use crate::memory::MemoryGrid;
use crate::transport::{Completion, RequestId, Transport, TransportError};

/// Transport that records requests and completes them on demand.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    next_id: u64,
    sent: Vec<(RequestId, PersistRequest)>,
    ready: Vec<Completion>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request sent so far, in order.
    pub fn sent(&self) -> &[(RequestId, PersistRequest)] {
        &self.sent
    }

    pub fn last_sent(&self) -> Option<&(RequestId, PersistRequest)> {
        self.sent.last()
    }

    /// Queue a completion for the next `poll`.
    pub fn resolve(&mut self, id: RequestId, result: Result<EditResponse, TransportError>) {
        self.ready.push(Completion { id, result });
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, request: PersistRequest) -> RequestId {
        self.next_id += 1;
        let id = RequestId(self.next_id);
        self.sent.push((id, request));
        id
    }

    fn poll(&mut self) -> Vec<Completion> {
        std::mem::take(&mut self.ready)
    }
}

// ---- fixtures ----

pub const ENDPOINT: &str = "/api/items";

pub fn template() -> BTreeMap<String, serde_json::Value> {
    let mut data = BTreeMap::new();
    data.insert("table".to_string(), serde_json::json!("items"));
    data
}

pub fn status_field() -> FieldDescriptor {
    FieldDescriptor::select(
        "status",
        vec![
            SelectOption::new("1", "Active"),
            SelectOption::new("0", "Inactive"),
        ],
    )
}

/// `name` text, `qty` numeric, persisted to `ENDPOINT`.
pub fn qty_options() -> EditorOptions {
    EditorOptions::new(vec![
        FieldDescriptor::text("name"),
        FieldDescriptor::numeric("qty"),
    ])
    .with_endpoint(ENDPOINT, template())
}

/// Every field type, persisted to `ENDPOINT`.
pub fn all_fields_options() -> EditorOptions {
    EditorOptions::new(vec![
        FieldDescriptor::text("name"),
        FieldDescriptor::numeric("qty"),
        status_field(),
        FieldDescriptor::checkbox("done"),
        FieldDescriptor::date("due"),
    ])
    .with_endpoint(ENDPOINT, template())
}

/// Columns: name, qty, status, done, due, notes (`notes` has no descriptor).
pub fn item_grid() -> MemoryGrid {
    let mut grid = MemoryGrid::new(&["name", "qty", "status", "done", "due", "notes"]);
    grid.add_row(Some("1"), &["Widget", "5", "Inactive", "0", "2024-05-01", "fragile"]);
    grid.add_row(Some("2"), &["Gadget", "12", "Active", "1", "2024-06-01", ""]);
    grid.add_row(Some("3"), &["Gizmo", "3", "Active", "0", "", ""]);
    grid
}

/// Controller, grid and collected events.
pub struct EditHarness {
    pub ctl: LifecycleController<RecordingTransport>,
    pub grid: MemoryGrid,
    events: Rc<RefCell<EventCollector>>,
}

impl EditHarness {
    pub fn new(options: EditorOptions, grid: MemoryGrid) -> Self {
        let mut ctl = LifecycleController::new(options, RecordingTransport::new())
            .expect("valid options");
        let events = EventCollector::shared();
        EventCollector::attach(&events, ctl.bus_mut());
        Self { ctl, grid, events }
    }

    /// Standard grid with every field type configured.
    pub fn items() -> Self {
        Self::new(all_fields_options(), item_grid())
    }

    pub fn events(&self) -> std::cell::Ref<'_, EventCollector> {
        self.events.borrow()
    }

    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn click(&mut self, row: usize, col: usize) -> Option<CellRef> {
        self.ctl.click(&mut self.grid, &CellRef::new(row, col))
    }

    /// Type into the control of a cell, replacing its value.
    pub fn type_value(&mut self, row: usize, col: usize, value: &str) {
        let control = self
            .grid
            .control_mut(CellRef::new(row, col))
            .expect("editor open");
        control.set_value(value);
    }

    pub fn enter(&mut self, row: usize, col: usize) -> bool {
        self.ctl.key_down(&mut self.grid, &CellRef::new(row, col), "Enter")
    }

    pub fn blur(&mut self, row: usize, col: usize) -> bool {
        self.ctl.focus_out(&mut self.grid, &CellRef::new(row, col))
    }

    pub fn sent(&self) -> &[(RequestId, PersistRequest)] {
        self.ctl.transport().sent()
    }

    fn last_id(&self) -> RequestId {
        self.ctl.transport().last_sent().expect("a request was sent").0
    }

    /// Complete the most recent request with `response` and pump.
    pub fn respond(&mut self, response: EditResponse) {
        let id = self.last_id();
        self.respond_to(id, Ok(response));
    }

    /// Fail the most recent request and pump.
    pub fn fail(&mut self, error: TransportError) {
        let id = self.last_id();
        self.respond_to(id, Err(error));
    }

    pub fn respond_to(&mut self, id: RequestId, result: Result<EditResponse, TransportError>) {
        self.ctl.transport_mut().resolve(id, result);
        self.ctl.pump(&mut self.grid);
    }

    pub fn text(&self, row: usize, col: usize) -> String {
        self.grid.text(CellRef::new(row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::ControlKind;
    use crate::events::{EditEvent, EventKind, Interaction};
    use crate::session::CellPhase;
    use celledit_protocol::HttpMethod;

    const NAME: usize = 0;
    const QTY: usize = 1;
    const STATUS: usize = 2;
    const DONE: usize = 3;
    const DUE: usize = 4;
    const NOTES: usize = 5;

    #[test]
    fn test_column_without_descriptor_is_untouched() {
        let mut h = EditHarness::items();
        let cell = h.click(0, NOTES).unwrap();

        assert_eq!(h.text(0, NOTES), "fragile");
        assert!(h.grid.control(cell).is_none());
        assert!(h.ctl.phase(cell).is_none());

        let events = h.events();
        assert_eq!(events.names(), vec!["cell.open", "cell.click"]);
        match &events.events()[1] {
            EditEvent::CellClick { field, editor, .. } => {
                assert_eq!(field.as_deref(), Some("notes"));
                assert!(editor.is_none());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_click_mounts_seeded_editor() {
        let mut h = EditHarness::items();
        let cell = h.click(0, QTY).unwrap();

        let control = h.grid.control(cell).unwrap();
        assert_eq!(control.kind(), ControlKind::Numeric);
        assert_eq!(control.value(), "5");
        assert!(control.is_focused());
        assert_eq!(h.ctl.phase(cell), Some(CellPhase::Editing));

        let events = h.events();
        match &events.events()[1] {
            EditEvent::CellClick { editor: Some(spec), .. } => {
                assert!(spec.has_class("numeric-type"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_second_click_keeps_editor() {
        let mut h = EditHarness::items();
        h.click(0, NAME);
        h.type_value(0, NAME, "Widget XL");
        h.click(0, NAME);

        assert_eq!(h.grid.control(CellRef::new(0, NAME)).unwrap().value(), "Widget XL");
        assert_eq!(h.ctl.session().get(CellRef::new(0, NAME)).unwrap().original, "Widget");
    }

    #[test]
    fn test_qty_edit_round_trip() {
        let mut h = EditHarness::items();
        h.click(0, QTY);
        h.type_value(0, QTY, "7");
        assert!(h.enter(0, QTY));

        let cell = CellRef::new(0, QTY);
        assert_eq!(h.ctl.phase(cell), Some(CellPhase::Committing));
        assert!(!h.grid.control(cell).unwrap().is_enabled());

        assert_eq!(h.sent().len(), 1);
        let (_, request) = &h.sent()[0];
        assert_eq!(request.endpoint, ENDPOINT);
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.payload.get("action"), Some("edit"));
        assert_eq!(request.payload.get("table"), Some("items"));
        assert_eq!(request.payload.get("data[1][qty]"), Some("7"));

        h.respond(EditResponse::ok());

        assert_eq!(h.text(0, QTY), "7");
        assert!(h.grid.control(cell).is_none());
        assert!(h.ctl.phase(cell).is_none());
        assert_eq!(
            h.events().names(),
            vec![
                "cell.open",
                "cell.click",
                "cell.preEdit",
                "row.changed",
                "cell.completeEdit",
                "cell.postEdit",
            ]
        );
        assert_eq!(h.events().post_edit_values(), vec!["7"]);
    }

    #[test]
    fn test_decimal_comma_is_sent_with_dot() {
        let mut h = EditHarness::items();
        h.click(1, QTY);
        h.type_value(1, QTY, "3,14");
        h.enter(1, QTY);

        let (_, request) = h.ctl.transport().last_sent().unwrap();
        assert_eq!(request.payload.get("data[2][qty]"), Some("3.14"));

        h.respond(EditResponse::ok());
        assert_eq!(h.text(1, QTY), "3.14");
        // postEdit carries what the user typed
        assert_eq!(h.events().post_edit_values(), vec!["3,14"]);
    }

    #[test]
    fn test_configured_method_is_used() {
        let options = qty_options().with_method(HttpMethod::Post);
        let mut h = EditHarness::new(options, item_grid());
        h.click(0, QTY);
        h.type_value(0, QTY, "8");
        h.enter(0, QTY);
        assert_eq!(h.sent()[0].1.method, HttpMethod::Post);
    }

    #[test]
    fn test_unchanged_value_sends_nothing() {
        let mut h = EditHarness::items();
        h.click(0, NAME);
        assert!(h.enter(0, NAME));

        assert!(h.sent().is_empty());
        assert_eq!(h.text(0, NAME), "Widget");
        assert!(h.grid.control(CellRef::new(0, NAME)).is_none());
        assert!(h.ctl.phase(CellRef::new(0, NAME)).is_none());

        let names = h.events().names();
        assert!(!names.contains(&"cell.completeEdit"));
        assert_eq!(names.last(), Some(&"cell.postEdit"));
    }

    #[test]
    fn test_unchanged_value_goes_through_row_hook() {
        let mut h = EditHarness::items();
        h.ctl.on_row_changed(|changed| Some(format!("{} ({})", changed.value, changed.field)));
        h.click(0, NAME);
        h.enter(0, NAME);

        assert!(h.sent().is_empty());
        assert_eq!(h.text(0, NAME), "Widget (name)");
    }

    #[test]
    fn test_no_matching_row_writes_coerced_value() {
        let mut grid = MemoryGrid::new(&["name", "qty"]);
        // Parses to 1 but no row carries the exact attribute "1"
        grid.add_row(Some("01"), &["Widget", "5"]);
        let mut h = EditHarness::new(qty_options(), grid);
        h.ctl.on_row_changed(|_| Some("from hook".into()));

        h.click(0, QTY);
        h.type_value(0, QTY, "2,5");
        h.enter(0, QTY);
        assert_eq!(h.sent()[0].1.payload.get("data[1][qty]"), Some("2.5"));

        h.respond(EditResponse::ok());
        assert_eq!(h.text(0, QTY), "2.5");
        assert!(h.events().row_changes().is_empty());
    }

    #[test]
    fn test_row_hook_overrides_written_value() {
        let mut h = EditHarness::items();
        h.ctl.on_row_changed(|changed| {
            let name = changed.row_data["name"].as_str().unwrap_or_default();
            Some(format!("{} x {}", changed.value, name))
        });

        h.click(2, NAME);
        h.click(0, QTY);
        h.type_value(0, QTY, "9");
        h.enter(0, QTY);
        h.respond(EditResponse::ok());

        assert_eq!(h.text(0, QTY), "9 x Widget");
        let events = h.events();
        let changes = events.row_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "qty");
        assert_eq!(changes[0].cell, CellRef::new(0, QTY));
        assert_eq!(changes[0].table_cell, Some(CellRef::new(0, QTY)));
        assert_eq!(changes[0].previous_cell, Some(CellRef::new(2, NAME)));
    }

    #[test]
    fn test_field_errors_keep_editor() {
        let mut h = EditHarness::items();
        let cell = CellRef::new(0, NAME);
        h.click(0, NAME);
        h.type_value(0, NAME, "");
        h.enter(0, NAME);
        h.respond(EditResponse::with_error("name", vec!["Required".into()]));

        let control = h.grid.control(cell).unwrap();
        assert!(control.is_enabled());
        assert_eq!(control.value(), "");
        assert!(h.grid.error_block(cell).unwrap().contains("Required"));
        assert_eq!(h.ctl.phase(cell), Some(CellPhase::Editing));

        let names = h.events().names();
        assert!(!names.contains(&"cell.completeEdit"));
        assert_eq!(names.last(), Some(&"cell.postEdit"));
    }

    #[test]
    fn test_retry_after_field_errors_replaces_block() {
        let mut h = EditHarness::items();
        let cell = CellRef::new(0, NAME);
        h.click(0, NAME);
        h.type_value(0, NAME, "");
        h.enter(0, NAME);
        h.respond(EditResponse::with_error("name", vec!["Required".into()]));

        h.type_value(0, NAME, "W");
        assert!(h.enter(0, NAME));
        assert_eq!(h.sent().len(), 2);
        h.respond(EditResponse::with_error("name", vec!["Too short".into()]));

        let block = h.grid.error_block(cell).unwrap();
        assert_eq!(block.messages, vec!["Too short".to_string()]);

        h.type_value(0, NAME, "Widget Pro");
        h.enter(0, NAME);
        h.respond(EditResponse::ok());
        assert_eq!(h.text(0, NAME), "Widget Pro");
        assert!(h.grid.error_block(cell).is_none());
    }

    #[test]
    fn test_empty_field_error_list_keeps_editor() {
        let mut h = EditHarness::items();
        let cell = CellRef::new(0, QTY);
        h.click(0, QTY);
        h.type_value(0, QTY, "7");
        h.enter(0, QTY);
        h.respond(serde_json::from_str(r#"{"fieldErrors": []}"#).unwrap());

        let control = h.grid.control(cell).unwrap();
        assert!(control.is_enabled());
        assert_eq!(control.value(), "7");
        assert_eq!(h.ctl.phase(cell), Some(CellPhase::Editing));
        assert!(h.grid.error_block(cell).unwrap().messages.is_empty());
        assert!(!h.events().names().contains(&"cell.completeEdit"));
    }

    #[test]
    fn test_enter_then_focus_out_commits_once() {
        let mut h = EditHarness::items();
        h.click(0, QTY);
        h.type_value(0, QTY, "6");
        assert!(h.enter(0, QTY));
        assert!(!h.blur(0, QTY));

        assert_eq!(h.sent().len(), 1);
        let pre_edits = h
            .events()
            .names()
            .iter()
            .filter(|name| **name == "cell.preEdit")
            .count();
        assert_eq!(pre_edits, 1);
    }

    #[test]
    fn test_focus_out_commits() {
        let mut h = EditHarness::items();
        h.click(0, DUE);
        h.type_value(0, DUE, "2024-05-02");
        assert!(h.blur(0, DUE));
        assert_eq!(h.sent()[0].1.payload.get("data[1][due]"), Some("2024-05-02"));
    }

    #[test]
    fn test_transport_failure_allows_retry() {
        let mut h = EditHarness::items();
        let cell = CellRef::new(0, QTY);
        h.click(0, QTY);
        h.type_value(0, QTY, "7");
        h.enter(0, QTY);
        h.fail(TransportError::Timeout("30s elapsed".into()));

        let control = h.grid.control(cell).unwrap();
        assert!(control.is_enabled());
        assert_eq!(control.value(), "7");
        assert_eq!(h.ctl.phase(cell), Some(CellPhase::Failed));
        assert!(!h.events().names().contains(&"cell.completeEdit"));
        assert_eq!(h.events().post_edit_values(), vec!["7"]);

        assert!(h.blur(0, QTY));
        assert_eq!(h.sent().len(), 2);
        h.respond(EditResponse::ok());
        assert_eq!(h.text(0, QTY), "7");
    }

    #[test]
    fn test_missing_endpoint_restores_original() {
        let options = EditorOptions::new(vec![FieldDescriptor::numeric("qty")]);
        let mut h = EditHarness::new(options, item_grid());
        h.click(0, QTY);
        h.type_value(0, QTY, "7");
        h.enter(0, QTY);

        assert!(h.sent().is_empty());
        assert_eq!(h.text(0, QTY), "5");
        assert!(h.ctl.phase(CellRef::new(0, QTY)).is_none());
        assert_eq!(h.events().post_edit_values(), vec!["7"]);
    }

    #[test]
    fn test_missing_row_id_restores_original() {
        let mut grid = MemoryGrid::new(&["name", "qty"]);
        grid.add_row(Some("new"), &["Draft", "1"]);
        let mut h = EditHarness::new(qty_options(), grid);

        h.click(0, QTY);
        h.type_value(0, QTY, "4");
        h.enter(0, QTY);

        assert!(h.sent().is_empty());
        assert_eq!(h.text(0, QTY), "1");
    }

    #[test]
    fn test_override_preselects_select() {
        let mut h = EditHarness::items();
        h.ctl.set("status", "Active");
        h.click(0, STATUS);

        let control = h.grid.control(CellRef::new(0, STATUS)).unwrap();
        assert_eq!(control.selected_label(), Some("Active"));
        assert_eq!(control.value(), "1");
        assert!(h.ctl.session().pending_override().is_none());
    }

    #[test]
    fn test_override_waits_for_its_field() {
        let mut h = EditHarness::items();
        h.ctl.set("status", "Inactive");
        h.click(0, NAME);
        assert_eq!(h.grid.control(CellRef::new(0, NAME)).unwrap().value(), "Widget");
        assert!(h.ctl.session().pending_override().is_some());

        h.click(1, STATUS);
        let first = h.grid.control(CellRef::new(1, STATUS)).unwrap();
        assert_eq!(first.selected_label(), Some("Inactive"));
        assert_eq!(h.ctl.session().get(CellRef::new(1, STATUS)).unwrap().original, "Inactive");

        // Consumed: the next status editor is seeded from its own text
        h.click(2, STATUS);
        let second = h.grid.control(CellRef::new(2, STATUS)).unwrap();
        assert_eq!(second.selected_label(), Some("Active"));
        assert!(h.ctl.session().get(CellRef::new(1, STATUS)).is_none());
    }

    #[test]
    fn test_select_ignores_enter() {
        let mut h = EditHarness::items();
        h.click(0, STATUS);
        h.grid.control_mut(CellRef::new(0, STATUS)).unwrap().select(0);

        assert!(!h.enter(0, STATUS));
        assert!(h.sent().is_empty());

        assert!(h.blur(0, STATUS));
        assert_eq!(h.sent()[0].1.payload.get("data[1][status]"), Some("1"));
    }

    #[test]
    fn test_select_collapses_same_column() {
        let mut h = EditHarness::items();
        h.click(0, STATUS);
        h.grid.control_mut(CellRef::new(0, STATUS)).unwrap().select(0);
        h.click(1, STATUS);

        assert_eq!(h.text(0, STATUS), "Active");
        assert!(h.grid.control(CellRef::new(0, STATUS)).is_none());
        assert!(h.ctl.phase(CellRef::new(0, STATUS)).is_none());
        assert_eq!(h.ctl.phase(CellRef::new(1, STATUS)), Some(CellPhase::Editing));
    }

    #[test]
    fn test_text_editor_collapses_selects_everywhere() {
        let mut h = EditHarness::items();
        h.click(0, STATUS);
        h.click(1, NAME);

        assert_eq!(h.text(0, STATUS), "Inactive");
        assert!(h.ctl.phase(CellRef::new(0, STATUS)).is_none());
        assert_eq!(h.ctl.session().open_cells(), vec![CellRef::new(1, NAME)]);
    }

    #[test]
    fn test_collapsed_committing_select_still_reconciles() {
        let mut h = EditHarness::items();
        let status = CellRef::new(0, STATUS);
        h.click(0, STATUS);
        h.grid.control_mut(status).unwrap().select(0);
        h.blur(0, STATUS);
        let id = h.sent()[0].0;

        h.click(1, NAME);
        assert_eq!(h.text(0, STATUS), "Active");
        assert_eq!(h.ctl.phase(status), Some(CellPhase::Committing));

        h.ctl.on_row_changed(|_| Some("Active".into()));
        h.respond_to(id, Ok(EditResponse::ok()));
        assert_eq!(h.text(0, STATUS), "Active");
        assert!(h.ctl.phase(status).is_none());
    }

    #[test]
    fn test_collapsed_rejected_select_restores_original() {
        let mut h = EditHarness::items();
        let status = CellRef::new(0, STATUS);
        h.click(0, STATUS);
        h.grid.control_mut(status).unwrap().select(0);
        h.blur(0, STATUS);

        h.click(1, NAME);
        assert_eq!(h.text(0, STATUS), "Active");
        h.clear_events();

        h.respond(EditResponse::with_error("status", vec!["Bad".into()]));
        assert_eq!(h.text(0, STATUS), "Inactive");
        assert!(h.grid.error_block(status).is_none());
        assert!(h.grid.control(status).is_none());
        assert!(h.ctl.phase(status).is_none());
        assert_eq!(h.events().names(), vec!["cell.postEdit"]);
    }

    #[test]
    fn test_collapsed_failed_select_restores_original() {
        let mut h = EditHarness::items();
        let status = CellRef::new(0, STATUS);
        h.click(0, STATUS);
        h.grid.control_mut(status).unwrap().select(0);
        h.blur(0, STATUS);
        h.click(1, NAME);

        h.fail(TransportError::Network("connection reset".into()));
        assert_eq!(h.text(0, STATUS), "Inactive");
        assert!(h.ctl.phase(status).is_none());
    }

    #[test]
    fn test_checkbox_commits_one_or_zero() {
        let mut h = EditHarness::items();
        let cell = CellRef::new(0, DONE);
        h.click(0, DONE);
        assert!(!h.grid.control(cell).unwrap().is_checked());
        h.grid.control_mut(cell).unwrap().set_checked(true);
        h.enter(0, DONE);

        assert_eq!(h.sent()[0].1.payload.get("data[1][done]"), Some("1"));
        h.respond(EditResponse::ok());
        assert_eq!(h.text(0, DONE), "1");

        h.click(1, DONE);
        h.grid.control_mut(CellRef::new(1, DONE)).unwrap().set_checked(false);
        h.enter(1, DONE);
        assert_eq!(h.sent()[1].1.payload.get("data[2][done]"), Some("0"));
    }

    #[test]
    fn test_cells_commit_independently() {
        let mut h = EditHarness::items();
        h.click(0, QTY);
        h.type_value(0, QTY, "50");
        h.enter(0, QTY);
        let first = h.sent()[0].0;

        h.click(1, QTY);
        h.type_value(1, QTY, "120");
        h.enter(1, QTY);
        let second = h.sent()[1].0;

        assert_eq!(h.ctl.session().in_flight_count(), 2);

        h.respond_to(second, Ok(EditResponse::ok()));
        assert_eq!(h.text(1, QTY), "120");
        assert_eq!(h.ctl.phase(CellRef::new(0, QTY)), Some(CellPhase::Committing));

        h.respond_to(first, Ok(EditResponse::ok()));
        assert_eq!(h.text(0, QTY), "50");
        assert!(h.ctl.session().open_cells().is_empty());
    }

    #[test]
    fn test_unknown_completion_is_ignored() {
        let mut h = EditHarness::items();
        h.click(0, QTY);
        h.respond_to(RequestId(99), Ok(EditResponse::ok()));
        assert_eq!(h.ctl.phase(CellRef::new(0, QTY)), Some(CellPhase::Editing));
        assert!(h.grid.control(CellRef::new(0, QTY)).is_some());
    }

    #[test]
    fn test_reopened_cell_ignores_stale_completion() {
        let mut h = EditHarness::items();
        let status = CellRef::new(0, STATUS);
        h.click(0, STATUS);
        h.grid.control_mut(status).unwrap().select(0);
        h.blur(0, STATUS);
        let stale = h.sent()[0].0;

        // Collapse it, then open a fresh editor on the same cell
        h.click(1, NAME);
        h.click(0, STATUS);
        assert_eq!(h.ctl.phase(status), Some(CellPhase::Editing));

        h.respond_to(stale, Ok(EditResponse::ok()));
        assert_eq!(h.ctl.phase(status), Some(CellPhase::Editing));
        assert!(h.grid.control(status).is_some());
    }

    #[test]
    fn test_off_stops_delivery() {
        let mut h = EditHarness::items();
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        let id = h.ctl.on(EventKind::CellOpen, move |_| *counter.borrow_mut() += 1);

        h.click(0, NAME);
        assert!(h.ctl.off(EventKind::CellOpen, id));
        h.click(1, NAME);
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_interactions_are_reported() {
        let mut h = EditHarness::items();
        h.click(0, QTY);
        h.clear_events();
        h.type_value(0, QTY, "1");
        h.enter(0, QTY);

        let events = h.events();
        match &events.events()[0] {
            EditEvent::CellPreEdit { interaction, .. } => {
                assert_eq!(*interaction, Interaction::KeyDown("Enter".into()));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}

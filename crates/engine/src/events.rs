//! Lifecycle events and the bus that delivers them.
//!
//! The bus is the only observation surface of the editor. Handlers run
//! synchronously, in registration order, on the thread that triggered the
//! event. A panicking handler propagates; there is no isolation.
//!
//! `row.changed` is special: besides plain observers it accepts hooks that
//! may return a replacement for the value about to be written into the cell.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use celledit_core::CellRef;

use crate::editor::EditorSpec;

/// Names of the events the editor emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CellOpen,
    CellClick,
    CellPreEdit,
    CellCompleteEdit,
    CellPostEdit,
    RowChanged,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::CellOpen,
        EventKind::CellClick,
        EventKind::CellPreEdit,
        EventKind::CellCompleteEdit,
        EventKind::CellPostEdit,
        EventKind::RowChanged,
    ];

    /// Wire name, e.g. `cell.preEdit`.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::CellOpen => "cell.open",
            EventKind::CellClick => "cell.click",
            EventKind::CellPreEdit => "cell.preEdit",
            EventKind::CellCompleteEdit => "cell.completeEdit",
            EventKind::CellPostEdit => "cell.postEdit",
            EventKind::RowChanged => "row.changed",
        }
    }

    pub fn from_name(name: &str) -> Option<EventKind> {
        EventKind::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The user interaction that started a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Click,
    /// Key name as reported by the host ("Enter", "a", ...)
    KeyDown(String),
    FocusOut,
}

/// Payload of `row.changed`.
#[derive(Debug, Clone, PartialEq)]
pub struct RowChanged {
    pub interaction: Interaction,
    /// Cell being committed
    pub cell: CellRef,
    /// Cell most recently clicked (may differ from `cell`)
    pub table_cell: Option<CellRef>,
    /// Raw value the user entered
    pub value: String,
    /// Current data snapshot of the row
    pub row_data: serde_json::Value,
    pub field: String,
    /// Cell clicked before `table_cell`
    pub previous_cell: Option<CellRef>,
}

/// Events emitted during the edit lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    /// A cell was clicked, before any editor is mounted.
    CellOpen { interaction: Interaction, cell: CellRef },

    /// Click handled. `editor` is the mounted editor, `None` if nothing was
    /// mounted (column not editable, or an editor was already open).
    CellClick {
        interaction: Interaction,
        cell: CellRef,
        field: Option<String>,
        editor: Option<EditorSpec>,
    },

    /// Commit triggered, before persistence.
    CellPreEdit { interaction: Interaction, cell: CellRef },

    /// The server accepted the edit.
    CellCompleteEdit { interaction: Interaction, cell: CellRef },

    /// The edit flow finished, whatever the outcome.
    CellPostEdit {
        interaction: Interaction,
        cell: CellRef,
        value: String,
    },

    /// Reconciliation is about to write the final value.
    RowChanged(RowChanged),
}

impl EditEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EditEvent::CellOpen { .. } => EventKind::CellOpen,
            EditEvent::CellClick { .. } => EventKind::CellClick,
            EditEvent::CellPreEdit { .. } => EventKind::CellPreEdit,
            EditEvent::CellCompleteEdit { .. } => EventKind::CellCompleteEdit,
            EditEvent::CellPostEdit { .. } => EventKind::CellPostEdit,
            EditEvent::RowChanged(_) => EventKind::RowChanged,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn cell(&self) -> CellRef {
        match self {
            EditEvent::CellOpen { cell, .. }
            | EditEvent::CellClick { cell, .. }
            | EditEvent::CellPreEdit { cell, .. }
            | EditEvent::CellCompleteEdit { cell, .. }
            | EditEvent::CellPostEdit { cell, .. } => *cell,
            EditEvent::RowChanged(changed) => changed.cell,
        }
    }
}

/// Handle returned by registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

type Observer = Box<dyn FnMut(&EditEvent)>;
type RowHook = Box<dyn FnMut(&RowChanged) -> Option<String>>;

enum Handler {
    Observer(Observer),
    Hook(RowHook),
}

/// Typed publish/subscribe register.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<EventKind, Vec<(HandlerId, Handler)>>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_handler_id(&mut self) -> HandlerId {
        self.next_id += 1;
        HandlerId(self.next_id)
    }

    /// Register an observer for one event kind.
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> HandlerId
    where
        F: FnMut(&EditEvent) + 'static,
    {
        let id = self.next_handler_id();
        self.handlers
            .entry(kind)
            .or_default()
            .push((id, Handler::Observer(Box::new(handler))));
        id
    }

    /// Register a `row.changed` hook. Returning `Some` replaces the value
    /// written into the cell; when several hooks answer, the last one wins.
    pub fn on_row_changed<F>(&mut self, hook: F) -> HandlerId
    where
        F: FnMut(&RowChanged) -> Option<String> + 'static,
    {
        let id = self.next_handler_id();
        self.handlers
            .entry(EventKind::RowChanged)
            .or_default()
            .push((id, Handler::Hook(Box::new(hook))));
        id
    }

    /// Remove one handler. Returns false if it was not registered for `kind`.
    pub fn off(&mut self, kind: EventKind, id: HandlerId) -> bool {
        let Some(list) = self.handlers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(handler_id, _)| *handler_id != id);
        list.len() != before
    }

    /// Deliver an event to every handler of its kind, in order.
    ///
    /// Returns the override supplied by `row.changed` hooks, if any.
    pub fn trigger(&mut self, event: &EditEvent) -> Option<String> {
        let list = self.handlers.get_mut(&event.kind())?;

        let mut replacement = None;
        for (_, handler) in list.iter_mut() {
            match handler {
                Handler::Observer(observer) => observer(event),
                Handler::Hook(hook) => {
                    if let EditEvent::RowChanged(changed) = event {
                        if let Some(value) = hook(changed) {
                            replacement = Some(value);
                        }
                    }
                }
            }
        }
        replacement
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, |list| list.len())
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut counts: Vec<(&'static str, usize)> = self
            .handlers
            .iter()
            .map(|(kind, list)| (kind.name(), list.len()))
            .collect();
        counts.sort();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}

/// Simple event collector for observers and tests.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<EditEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// A collector that can be captured by handlers.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Register `collector` on every event kind of `bus`.
    pub fn attach(collector: &Rc<RefCell<Self>>, bus: &mut EventBus) -> Vec<HandlerId> {
        EventKind::ALL
            .into_iter()
            .map(|kind| {
                let sink = Rc::clone(collector);
                bus.on(kind, move |event| sink.borrow_mut().push(event.clone()))
            })
            .collect()
    }

    pub fn push(&mut self, event: EditEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[EditEvent] {
        &self.events
    }

    /// Event names in delivery order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.iter().map(|e| e.name()).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Values carried by `cell.postEdit` events.
    pub fn post_edit_values(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                EditEvent::CellPostEdit { value, .. } => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Only `row.changed` payloads.
    pub fn row_changes(&self) -> Vec<&RowChanged> {
        self.events
            .iter()
            .filter_map(|e| match e {
                EditEvent::RowChanged(changed) => Some(changed),
                _ => None,
            })
            .collect()
    }
}

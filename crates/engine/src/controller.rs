//! Lifecycle controller.
//!
//! The state machine behind inline editing. The host forwards three kinds of
//! interaction (clicks, key presses, focus loss) together with the grid they
//! happened in; the controller opens editors, decides when an edit commits,
//! and runs the commit pipeline (see `commit.rs`).
//!
//! Per cell: `Idle → Editing → Committing → Idle`, with `Failed` as an
//! editable side state after a transport error.

use celledit_config::{ConfigError, EditorOptions};
use celledit_core::{CellRef, FieldRegistry};

use crate::editor::{EditorFactory, EditorSpec};
use crate::events::{EditEvent, EventBus, EventKind, HandlerId, Interaction, RowChanged};
use crate::grid::Grid;
use crate::session::{CellPhase, EditSession};
use crate::transport::Transport;

/// Key that commits input-backed editors.
pub const COMMIT_KEY: &str = "Enter";

/// Orchestrates editors, sessions and persistence for one table.
pub struct LifecycleController<T: Transport> {
    pub(crate) options: EditorOptions,
    pub(crate) registry: FieldRegistry,
    pub(crate) bus: EventBus,
    pub(crate) session: EditSession,
    pub(crate) transport: T,
}

impl<T: Transport> LifecycleController<T> {
    /// Validate `options` and build a controller around `transport`.
    pub fn new(options: EditorOptions, transport: T) -> Result<Self, ConfigError> {
        options.validate()?;
        let registry = options.registry()?;
        log::debug!("Inline editing enabled for {} field(s)", registry.len());

        Ok(Self {
            options,
            registry,
            bus: EventBus::new(),
            session: EditSession::new(),
            transport,
        })
    }

    // ---- public API ----

    /// Subscribe to an event.
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> HandlerId
    where
        F: FnMut(&EditEvent) + 'static,
    {
        self.bus.on(kind, handler)
    }

    /// Subscribe to `row.changed` with the ability to replace the written value.
    pub fn on_row_changed<F>(&mut self, hook: F) -> HandlerId
    where
        F: FnMut(&RowChanged) -> Option<String> + 'static,
    {
        self.bus.on_row_changed(hook)
    }

    /// Unsubscribe one handler.
    pub fn off(&mut self, kind: EventKind, id: HandlerId) -> bool {
        self.bus.off(kind, id)
    }

    /// Seed the next editor opened for `field` with `value` instead of the
    /// cell's text. One-shot; a later call replaces an unused one.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.session.set_override(field, value);
    }

    // ---- interactions ----

    /// A click landed on `node`. Returns the cell it resolved to, if it is
    /// inside the configured cell selector.
    pub fn click<G: Grid>(&mut self, grid: &mut G, node: &G::Node) -> Option<CellRef> {
        let cell = grid.resolve_cell(node, self.options.cell_selector.as_deref())?;

        self.bus.trigger(&EditEvent::CellOpen {
            interaction: Interaction::Click,
            cell,
        });
        self.session.focus_cell(cell);

        let field = grid.column_field(cell.col);
        let editor = match field.as_deref() {
            Some(name) => self.open_editor(grid, cell, name),
            None => None,
        };

        self.bus.trigger(&EditEvent::CellClick {
            interaction: Interaction::Click,
            cell,
            field,
            editor,
        });
        Some(cell)
    }

    /// A key went down inside an editor. Only Enter commits, and never for
    /// selects. Returns true if a commit started.
    pub fn key_down<G: Grid>(&mut self, grid: &mut G, node: &G::Node, key: &str) -> bool {
        if key != COMMIT_KEY {
            return false;
        }
        let Some(cell) = grid.resolve_cell(node, self.options.cell_selector.as_deref()) else {
            return false;
        };
        match grid.control(cell) {
            Some(control) if control.commits_on_enter() => {}
            _ => return false,
        }
        self.commit(grid, cell, Interaction::KeyDown(key.to_string()))
    }

    /// An editor lost focus. Returns true if a commit started; a cell already
    /// committing (after Enter) ignores it.
    pub fn focus_out<G: Grid>(&mut self, grid: &mut G, node: &G::Node) -> bool {
        let Some(cell) = grid.resolve_cell(node, self.options.cell_selector.as_deref()) else {
            return false;
        };
        if let Some(control) = grid.control_mut(cell) {
            control.blur();
        }
        self.commit(grid, cell, Interaction::FocusOut)
    }

    /// Drain the transport and feed every completion into the pipeline.
    /// Returns how many were handled.
    pub fn pump<G: Grid>(&mut self, grid: &mut G) -> usize {
        let completions = self.transport.poll();
        let count = completions.len();
        for completion in completions {
            self.complete(grid, completion);
        }
        count
    }

    fn open_editor<G: Grid>(&mut self, grid: &mut G, cell: CellRef, name: &str) -> Option<EditorSpec> {
        let field = self.registry.find(name)?.clone();
        if grid.control(cell).is_some() {
            return None;
        }

        let original = self
            .session
            .take_override(&field.name)
            .unwrap_or_else(|| grid.text(cell));
        let spec = EditorFactory::build(&field, &original);
        let collapsed = EditorFactory::mount(grid, cell, spec.clone())?;

        for other in collapsed {
            if self.session.discard_if_idle(other) {
                log::debug!("Closed editor of {} (select collapsed)", other);
            }
        }
        log::debug!("Opened {} editor on {} for '{}'", field.field_type.as_str(), cell, field.name);
        self.session.open(cell, field, original);
        Some(spec)
    }

    // ---- inspection ----

    pub fn phase(&self, cell: CellRef) -> Option<CellPhase> {
        self.session.phase(cell)
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// The event bus, for attaching collectors to every kind at once.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T: Transport> std::fmt::Debug for LifecycleController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleController")
            .field("fields", &self.registry.len())
            .field("bus", &self.bus)
            .field("session", &self.session)
            .finish()
    }
}

pub mod commit;
pub mod controller;
pub mod editor;
pub mod events;
pub mod grid;
pub mod memory;
pub mod session;
pub mod transport;

#[cfg(test)]
pub mod harness;

pub use commit::{coerce, coerce_numeric, is_truthy};
pub use controller::LifecycleController;
pub use editor::{Control, ControlKind, EditorFactory, EditorSpec};
pub use events::{EditEvent, EventBus, EventCollector, EventKind, HandlerId, Interaction, RowChanged};
pub use grid::{CellContent, ErrorBlock, Grid};
pub use memory::MemoryGrid;
pub use session::{CellPhase, EditSession};
pub use transport::{Completion, RequestId, Transport, TransportError};

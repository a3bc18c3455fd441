//! The grid seam.
//!
//! The editor never owns the table. It borrows whatever widget hosts the
//! cells through this trait: node → cell resolution, column → field mapping,
//! row identity and data, and read/write access to what a cell displays.

use celledit_core::{CellRef, RowId};

use crate::editor::Control;

/// What a cell currently displays.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// Plain display text
    Text(String),
    /// A mounted editor control
    Control(Control),
}

impl CellContent {
    pub fn as_control(&self) -> Option<&Control> {
        match self {
            CellContent::Control(control) => Some(control),
            CellContent::Text(_) => None,
        }
    }

    pub fn as_control_mut(&mut self) -> Option<&mut Control> {
        match self {
            CellContent::Control(control) => Some(control),
            CellContent::Text(_) => None,
        }
    }

    /// Text the cell shows; controls render none of their own.
    pub fn text(&self) -> &str {
        match self {
            CellContent::Text(text) => text,
            CellContent::Control(_) => "",
        }
    }
}

/// Inline validation messages appended beneath a cell. Hosts reveal it
/// with a vertical expand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBlock {
    pub messages: Vec<String>,
}

impl ErrorBlock {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    pub fn contains(&self, message: &str) -> bool {
        self.messages.iter().any(|m| m == message)
    }
}

/// The tabular widget the editor works against.
pub trait Grid {
    /// Host handle for whatever received the interaction (a cell, or a
    /// control inside a cell).
    type Node;

    /// Resolve the cell a node belongs to, if that cell matches `selector`
    /// (`None` matches every body cell).
    fn resolve_cell(&self, node: &Self::Node, selector: Option<&str>) -> Option<CellRef>;

    /// Field name bound to a column.
    fn column_field(&self, col: usize) -> Option<String>;

    /// Raw `data-id` attribute of a body row.
    fn row_attribute(&self, row: usize) -> Option<String>;

    /// Current data snapshot of the row with this identifier.
    fn row_data(&self, id: RowId) -> Option<serde_json::Value>;

    /// Every body cell of the table.
    fn body_cells(&self) -> Vec<CellRef>;

    fn content(&self, cell: CellRef) -> Option<&CellContent>;

    fn content_mut(&mut self, cell: CellRef) -> Option<&mut CellContent>;

    fn set_content(&mut self, cell: CellRef, content: CellContent);

    fn error_block(&self, cell: CellRef) -> Option<&ErrorBlock>;

    /// Replace (or with `None`, remove) the error block of a cell.
    fn set_error_block(&mut self, cell: CellRef, block: Option<ErrorBlock>);

    // ---- provided ----

    /// Trimmed display text.
    fn text(&self, cell: CellRef) -> String {
        self.content(cell)
            .map(|content| content.text().trim().to_string())
            .unwrap_or_default()
    }

    fn control(&self, cell: CellRef) -> Option<&Control> {
        self.content(cell).and_then(CellContent::as_control)
    }

    fn control_mut(&mut self, cell: CellRef) -> Option<&mut Control> {
        self.content_mut(cell).and_then(CellContent::as_control_mut)
    }

    /// Parsed row identifier of the row a cell sits in.
    fn row_id(&self, cell: CellRef) -> Option<RowId> {
        self.row_attribute(cell.row)
            .and_then(|raw| RowId::parse_attr(&raw))
    }

    /// Empty the cell and show `text`; any control or error block goes away.
    fn write_text(&mut self, cell: CellRef, text: &str) {
        self.set_error_block(cell, None);
        self.set_content(cell, CellContent::Text(text.to_string()));
    }
}

//! In-memory grid.
//!
//! A headless `Grid` for hosts without a widget toolkit and for tests. Rows
//! carry a raw `data-id` attribute and a JSON data snapshot; columns carry the
//! bound field name and an optional class used by cell selectors.
//!
//! Supported selectors: `td`, `*`, `.class` and `td.class`. Anything else
//! matches nothing.

use std::collections::HashMap;

use celledit_core::{CellRef, RowId};

use crate::grid::{CellContent, ErrorBlock, Grid};

#[derive(Debug, Clone)]
struct Column {
    field: String,
    class: Option<String>,
}

#[derive(Debug, Clone)]
struct Row {
    id_attr: Option<String>,
    data: serde_json::Value,
    cells: Vec<CellContent>,
}

/// Headless table.
#[derive(Debug, Clone, Default)]
pub struct MemoryGrid {
    columns: Vec<Column>,
    rows: Vec<Row>,
    errors: HashMap<CellRef, ErrorBlock>,
}

impl MemoryGrid {
    /// A grid whose columns are bound to `fields`, in order.
    pub fn new(fields: &[&str]) -> Self {
        Self {
            columns: fields
                .iter()
                .map(|field| Column {
                    field: field.to_string(),
                    class: None,
                })
                .collect(),
            rows: Vec::new(),
            errors: HashMap::new(),
        }
    }

    /// Give a column a class for selector matching.
    pub fn with_column_class(mut self, col: usize, class: &str) -> Self {
        if let Some(column) = self.columns.get_mut(col) {
            column.class = Some(class.to_string());
        }
        self
    }

    /// Append a row and return its index. Missing values are empty; the
    /// data snapshot maps each field to its text, plus `id` when the
    /// attribute parses.
    pub fn add_row(&mut self, id_attr: Option<&str>, values: &[&str]) -> usize {
        let mut data = serde_json::Map::new();
        if let Some(id) = id_attr.and_then(RowId::parse_attr) {
            data.insert("id".into(), serde_json::json!(id.raw()));
        }

        let cells = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let text = values.get(idx).copied().unwrap_or_default();
                data.insert(column.field.clone(), serde_json::json!(text));
                CellContent::Text(text.to_string())
            })
            .collect();

        self.rows.push(Row {
            id_attr: id_attr.map(String::from),
            data: serde_json::Value::Object(data),
            cells,
        });
        self.rows.len() - 1
    }

    /// Replace a row's data snapshot.
    pub fn set_row_data(&mut self, row: usize, data: serde_json::Value) {
        if let Some(r) = self.rows.get_mut(row) {
            r.data = data;
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_matches(&self, col: usize, selector: Option<&str>) -> bool {
        let Some(selector) = selector.map(str::trim) else {
            return true;
        };
        if selector == "td" || selector == "*" {
            return true;
        }

        let class = match selector.strip_prefix("td") {
            Some(rest) => rest.strip_prefix('.'),
            None => selector.strip_prefix('.'),
        };
        match (class, self.columns.get(col).and_then(|c| c.class.as_deref())) {
            (Some(wanted), Some(classes)) => classes.split_whitespace().any(|c| c == wanted),
            _ => false,
        }
    }
}

impl Grid for MemoryGrid {
    type Node = CellRef;

    fn resolve_cell(&self, node: &CellRef, selector: Option<&str>) -> Option<CellRef> {
        let in_bounds = self
            .rows
            .get(node.row)
            .is_some_and(|row| node.col < row.cells.len());
        if in_bounds && self.column_matches(node.col, selector) {
            Some(*node)
        } else {
            None
        }
    }

    fn column_field(&self, col: usize) -> Option<String> {
        self.columns.get(col).map(|c| c.field.clone())
    }

    fn row_attribute(&self, row: usize) -> Option<String> {
        self.rows.get(row).and_then(|r| r.id_attr.clone())
    }

    /// Rows are found by exact attribute text, like an attribute selector.
    fn row_data(&self, id: RowId) -> Option<serde_json::Value> {
        let wanted = id.to_string();
        self.rows
            .iter()
            .find(|r| r.id_attr.as_deref() == Some(wanted.as_str()))
            .map(|r| r.data.clone())
    }

    fn body_cells(&self) -> Vec<CellRef> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(row, r)| (0..r.cells.len()).map(move |col| CellRef::new(row, col)))
            .collect()
    }

    fn content(&self, cell: CellRef) -> Option<&CellContent> {
        self.rows.get(cell.row).and_then(|r| r.cells.get(cell.col))
    }

    fn content_mut(&mut self, cell: CellRef) -> Option<&mut CellContent> {
        self.rows
            .get_mut(cell.row)
            .and_then(|r| r.cells.get_mut(cell.col))
    }

    fn set_content(&mut self, cell: CellRef, content: CellContent) {
        if let Some(slot) = self.content_mut(cell) {
            *slot = content;
        }
    }

    fn error_block(&self, cell: CellRef) -> Option<&ErrorBlock> {
        self.errors.get(&cell)
    }

    fn set_error_block(&mut self, cell: CellRef, block: Option<ErrorBlock>) {
        match block {
            Some(block) => {
                self.errors.insert(cell, block);
            }
            None => {
                self.errors.remove(&cell);
            }
        }
    }
}

//! Editor factory and mounted controls.
//!
//! `EditorFactory::build` turns a field descriptor plus the cell's current
//! text into an `EditorSpec`: which control, seeded with what, offering which
//! choices. `EditorFactory::mount` places it into a grid cell and enforces
//! select exclusivity:
//!
//! - a select being mounted collapses other open selects in its column;
//! - a focus-taking control (text, numeric, checkbox) collapses every other
//!   open select in the table.
//!
//! Dates take no focus and collapse nothing.

use celledit_core::{CellRef, FieldDescriptor, FieldType};

use crate::grid::{CellContent, Grid};

/// Marker class carried by numeric inputs.
pub const NUMERIC_MARKER_CLASS: &str = "numeric-type";

/// Which control is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Text,
    Numeric,
    Select,
    Checkbox,
    Date,
}

impl From<FieldType> for ControlKind {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => ControlKind::Text,
            FieldType::Numeric => ControlKind::Numeric,
            FieldType::Select => ControlKind::Select,
            FieldType::Checkbox => ControlKind::Checkbox,
            FieldType::Date => ControlKind::Date,
        }
    }
}

/// One option of a select editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Description of an editor, before it is mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSpec {
    pub kind: ControlKind,
    /// Field the editor edits
    pub field: String,
    /// Initial value of single-value controls
    pub value: String,
    /// Initial state of a checkbox
    pub checked: bool,
    /// Options of a select, in field order
    pub choices: Vec<Choice>,
    /// Space separated class list
    pub class_name: String,
    pub autocomplete: bool,
    /// Take focus (caret at end) once mounted
    pub autofocus: bool,
}

impl EditorSpec {
    /// Index of the pre-selected choice.
    pub fn selected_choice(&self) -> Option<usize> {
        self.choices.iter().position(|c| c.selected)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_name.split_whitespace().any(|c| c == class)
    }
}

/// A mounted editor and its live state.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    spec: EditorSpec,
    value: String,
    selected: Option<usize>,
    checked: bool,
    enabled: bool,
    focused: bool,
    caret: Option<usize>,
}

impl Control {
    /// Instantiate a spec. Selects without a matching label fall back to the
    /// first option, as a browser would.
    pub fn mount(spec: EditorSpec) -> Self {
        let selected = spec
            .selected_choice()
            .or(if spec.choices.is_empty() { None } else { Some(0) });
        Self {
            value: spec.value.clone(),
            checked: spec.checked,
            selected,
            enabled: true,
            focused: false,
            caret: None,
            spec,
        }
    }

    pub fn spec(&self) -> &EditorSpec {
        &self.spec
    }

    pub fn kind(&self) -> ControlKind {
        self.spec.kind
    }

    /// Raw value as the control would report it.
    ///
    /// Selects report the selected option's value, checkboxes `"1"`/`"0"`.
    pub fn value(&self) -> String {
        match self.spec.kind {
            ControlKind::Select => self
                .selected
                .and_then(|idx| self.spec.choices.get(idx))
                .map(|choice| choice.value.clone())
                .unwrap_or_default(),
            ControlKind::Checkbox => if self.checked { "1" } else { "0" }.to_string(),
            ControlKind::Text | ControlKind::Numeric | ControlKind::Date => self.value.clone(),
        }
    }

    /// Set the value the way user input would.
    ///
    /// Selects pick the option with that value (unknown values are ignored),
    /// checkboxes are checked by `"1"`.
    pub fn set_value(&mut self, value: &str) {
        match self.spec.kind {
            ControlKind::Select => {
                if let Some(idx) = self.spec.choices.iter().position(|c| c.value == value) {
                    self.selected = Some(idx);
                }
            }
            ControlKind::Checkbox => self.checked = value == "1",
            ControlKind::Text | ControlKind::Numeric | ControlKind::Date => {
                self.value = value.to_string();
                if self.focused {
                    self.caret = Some(self.value.chars().count());
                }
            }
        }
    }

    /// Select by index. Returns false if out of range.
    pub fn select(&mut self, idx: usize) -> bool {
        if idx < self.spec.choices.len() {
            self.selected = Some(idx);
            true
        } else {
            false
        }
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Label of the selected option (selects only).
    pub fn selected_label(&self) -> Option<&str> {
        self.selected
            .and_then(|idx| self.spec.choices.get(idx))
            .map(|choice| choice.label.as_str())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Caret position in characters, when focused.
    pub fn caret(&self) -> Option<usize> {
        self.caret
    }

    /// Focus with the caret after the last character.
    pub fn focus(&mut self) {
        self.focused = true;
        self.caret = Some(self.value.chars().count());
    }

    pub fn blur(&mut self) {
        self.focused = false;
        self.caret = None;
    }

    /// Enter commits every input-backed control; selects commit on blur only.
    pub fn commits_on_enter(&self) -> bool {
        self.spec.kind != ControlKind::Select
    }
}

/// Builds and mounts editors.
pub struct EditorFactory;

impl EditorFactory {
    /// Describe the editor for `field`, seeded with `current_text`.
    pub fn build(field: &FieldDescriptor, current_text: &str) -> EditorSpec {
        let kind = ControlKind::from(field.field_type);
        let mut spec = EditorSpec {
            kind,
            field: field.name.clone(),
            value: String::new(),
            checked: false,
            choices: Vec::new(),
            class_name: field.effective_class(),
            autocomplete: true,
            autofocus: field.field_type.takes_focus(),
        };

        match kind {
            ControlKind::Text | ControlKind::Date => {
                spec.value = current_text.to_string();
            }
            ControlKind::Numeric => {
                spec.value = current_text.to_string();
                spec.class_name = join_class(&spec.class_name, NUMERIC_MARKER_CLASS);
                spec.autocomplete = false;
            }
            ControlKind::Select => {
                spec.choices = field
                    .options
                    .iter()
                    .map(|option| Choice {
                        value: option.value.clone(),
                        label: option.label.clone(),
                        selected: option.label == current_text,
                    })
                    .collect();
            }
            ControlKind::Checkbox => {
                spec.checked = current_text == "1";
            }
        }

        spec
    }

    /// Mount `spec` into `cell`.
    ///
    /// Returns the cells whose select was collapsed to make room, or `None`
    /// when the cell already holds a control (nothing is touched then).
    pub fn mount<G: Grid>(grid: &mut G, cell: CellRef, spec: EditorSpec) -> Option<Vec<CellRef>> {
        if grid.control(cell).is_some() {
            return None;
        }

        let mut collapsed = Vec::new();
        if spec.kind == ControlKind::Select {
            collapsed.extend(collapse_selects(grid, cell, Some(cell.col)));
        }

        let autofocus = spec.autofocus;
        grid.set_content(cell, CellContent::Control(Control::mount(spec)));

        if autofocus {
            blur_others(grid, cell);
            if let Some(control) = grid.control_mut(cell) {
                control.focus();
            }
            collapsed.extend(collapse_selects(grid, cell, None));
        }

        Some(collapsed)
    }
}

/// Replace the select in `cell` with its selected label. Returns false if the
/// cell holds no select.
pub fn collapse_select<G: Grid>(grid: &mut G, cell: CellRef) -> bool {
    let label = match grid.control(cell) {
        Some(control) if control.kind() == ControlKind::Select => {
            control.selected_label().unwrap_or_default().to_string()
        }
        _ => return false,
    };
    grid.write_text(cell, &label);
    true
}

/// Collapse open selects other than `except`, optionally within one column.
fn collapse_selects<G: Grid>(grid: &mut G, except: CellRef, column: Option<usize>) -> Vec<CellRef> {
    let targets: Vec<CellRef> = grid
        .body_cells()
        .into_iter()
        .filter(|cell| *cell != except)
        .filter(|cell| column.map_or(true, |col| cell.col == col))
        .collect();

    targets
        .into_iter()
        .filter(|cell| collapse_select(grid, *cell))
        .collect()
}

/// Only one control holds focus at a time.
fn blur_others<G: Grid>(grid: &mut G, except: CellRef) {
    for cell in grid.body_cells() {
        if cell == except {
            continue;
        }
        if let Some(control) = grid.control_mut(cell) {
            control.blur();
        }
    }
}

fn join_class(base: &str, extra: &str) -> String {
    if base.is_empty() {
        extra.to_string()
    } else {
        format!("{} {}", base, extra)
    }
}

//! Editable field descriptors.
//!
//! One descriptor per grid column that supports in-place editing. The
//! descriptor decides which control the editor factory mounts, which choices
//! a select offers and how the committed value is coerced.

use serde::{Deserialize, Serialize};

/// Class applied to text-like controls when the field names none.
pub const DEFAULT_INPUT_CLASS: &str = "form-control";

/// Class every select editor carries, in front of the field's own class.
pub const SELECT_CLASS: &str = "custom-editor-select";

/// The kind of value a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Numeric,
    Select,
    Checkbox,
    Date,
}

impl FieldType {
    /// Stable lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Numeric => "numeric",
            FieldType::Select => "select",
            FieldType::Checkbox => "checkbox",
            FieldType::Date => "date",
        }
    }

    /// Controls that take focus (caret at end) when mounted.
    pub fn takes_focus(&self) -> bool {
        !matches!(self, FieldType::Select | FieldType::Date)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Value submitted when this option is chosen
    pub value: String,
    /// Text shown in the cell and in the dropdown
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Static metadata describing how a column's values are edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name as bound to the grid column
    pub name: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// Choices, only meaningful for `select`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,

    /// Styling hint; `None` means the per-type default
    #[serde(rename = "className", default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            options: Vec::new(),
            class_name: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Numeric)
    }

    pub fn checkbox(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Checkbox)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Date)
    }

    pub fn select(name: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self {
            options,
            ..Self::new(name, FieldType::Select)
        }
    }

    /// Set the styling hint.
    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Class list of the mounted control, after per-type defaults.
    ///
    /// Text-like controls use the field's class or `form-control`; selects
    /// always carry `custom-editor-select` followed by the field's class.
    pub fn effective_class(&self) -> String {
        match self.field_type {
            FieldType::Select => match &self.class_name {
                Some(class) => format!("{} {}", SELECT_CLASS, class),
                None => SELECT_CLASS.to_string(),
            },
            FieldType::Checkbox => self.class_name.clone().unwrap_or_default(),
            FieldType::Text | FieldType::Numeric | FieldType::Date => self
                .class_name
                .clone()
                .unwrap_or_else(|| DEFAULT_INPUT_CLASS.to_string()),
        }
    }

    /// Option whose label matches `label` exactly (case-sensitive).
    pub fn option_by_label(&self, label: &str) -> Option<(usize, &SelectOption)> {
        self.options.iter().enumerate().find(|(_, o)| o.label == label)
    }
}

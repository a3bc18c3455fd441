//! celledit persist protocol: request and response wire format
//!
//! One commit is one request. The payload is a flat list of form fields:
//!
//! ```text
//! action=edit
//! <every entry of the configured data template>
//! data[<row id>][<field name>]=<coerced value>
//! ```
//!
//! The response is JSON. A body carrying a non-empty `fieldErrors` array is a
//! validation failure; anything else is success.
//!
//! # Usage
//!
//! ```ignore
//! use celledit_protocol::{EditPayload, EditResponse, HttpMethod, PersistRequest};
//!
//! let payload = EditPayload::build(&template, RowId(7), "qty", "3.14");
//! let request = PersistRequest::new("/rows", HttpMethod::Put, payload);
//! let response: EditResponse = serde_json::from_str(&body)?;
//! ```

use std::collections::BTreeMap;

use celledit_core::RowId;
use serde::{Deserialize, Deserializer, Serialize};

/// Value of the `action` form field on every edit request.
pub const ACTION_EDIT: &str = "edit";

// =============================================================================
// Request
// =============================================================================

/// HTTP verb used to persist an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    /// Partial update; the default
    #[default]
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered form fields of an edit request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct EditPayload {
    fields: Vec<(String, String)>,
}

impl EditPayload {
    /// Assemble the payload for one cell edit.
    ///
    /// Template entries follow `action`; a template key equal to `action`
    /// replaces the default. The cell's own entry always comes last.
    pub fn build(
        template: &BTreeMap<String, serde_json::Value>,
        row: RowId,
        field: &str,
        value: &str,
    ) -> Self {
        let mut payload = Self::default();
        payload.set("action", ACTION_EDIT);
        for (key, value) in template {
            payload.set(key, &scalar_text(value));
        }
        payload.set(&data_key(row, field), value);
        payload
    }

    /// Insert or replace a field, keeping first-insertion order.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.fields.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Form key carrying the edited value: `data[<row>][<field>]`.
pub fn data_key(row: RowId, field: &str) -> String {
    format!("data[{}][{}]", row, field)
}

/// Form text of a template value. Strings go through untouched, `null` is
/// empty, composite values are sent as JSON.
fn scalar_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// A fully-resolved persist call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistRequest {
    pub endpoint: String,
    pub method: HttpMethod,
    pub payload: EditPayload,
}

impl PersistRequest {
    pub fn new(endpoint: impl Into<String>, method: HttpMethod, payload: EditPayload) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            payload,
        }
    }
}

// =============================================================================
// Response
// =============================================================================

/// Parsed response body of an edit request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EditResponse {
    /// Server-side validation failures, per field
    #[serde(rename = "fieldErrors", default, skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<Vec<FieldError>>,

    /// Everything else the server sent (row data, ids, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EditResponse {
    /// A success body with nothing in it.
    pub fn ok() -> Self {
        Self::default()
    }

    /// A failure body with one field error.
    pub fn with_error(field: impl Into<String>, statuses: Vec<String>) -> Self {
        Self {
            field_errors: Some(vec![FieldError {
                name: Some(field.into()),
                status: statuses,
            }]),
            extra: serde_json::Map::new(),
        }
    }

    /// True if the body carries `fieldErrors` at all, even an empty list.
    pub fn has_field_errors(&self) -> bool {
        self.field_errors.is_some()
    }

    /// All status messages across all field errors, in order.
    pub fn error_messages(&self) -> Vec<String> {
        self.field_errors
            .iter()
            .flatten()
            .flat_map(|error| error.status.iter().cloned())
            .collect()
    }
}

/// Validation failure for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Status messages; a bare string on the wire is read as one message
    #[serde(default, deserialize_with = "one_or_many")]
    pub status: Vec<String>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}

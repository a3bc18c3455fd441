// Editor options
// Loaded from ~/.config/celledit/editor.json (or any .json / .toml path)

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use celledit_core::{FieldDescriptor, FieldRegistry, FieldType};
use celledit_protocol::HttpMethod;
use serde::{Deserialize, Serialize};

/// Transport timeout applied when the options do not name one.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Error loading or validating options.
#[derive(Debug)]
pub enum ConfigError {
    /// File could not be read
    Io(String),
    /// File content is not valid JSON/TOML for the options schema
    Parse(String),
    /// Content parsed but breaks an invariant
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "I/O error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid options: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Everything the in-place editor is configured with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorOptions {
    /// Selector scoping which cells react to clicks; `None` = every body cell
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_selector: Option<String>,

    /// Editable fields, at most one per name
    pub fields: Vec<FieldDescriptor>,

    /// Persist endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Payload template merged into every edit request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, serde_json::Value>>,

    /// HTTP verb override; `None` = PUT
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,

    /// Give up on a persist request after this many milliseconds
    pub timeout_ms: u64,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            cell_selector: None,
            fields: Vec::new(),
            url: None,
            data: None,
            method: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl EditorOptions {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Set endpoint and payload template together; both are needed to persist.
    pub fn with_endpoint(
        mut self,
        url: impl Into<String>,
        data: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        self.url = Some(url.into());
        self.data = Some(data);
        self
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_cell_selector(mut self, selector: impl Into<String>) -> Self {
        self.cell_selector = Some(selector.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// HTTP verb actually used.
    pub fn effective_method(&self) -> HttpMethod {
        self.method.unwrap_or_default()
    }

    /// Persist timeout (zero in the file falls back to the default).
    pub fn timeout(&self) -> Duration {
        if self.timeout_ms == 0 {
            Duration::from_millis(DEFAULT_TIMEOUT_MS)
        } else {
            Duration::from_millis(self.timeout_ms)
        }
    }

    /// Endpoint and template, only when both are configured.
    pub fn persist_target(&self) -> Option<(&str, &BTreeMap<String, serde_json::Value>)> {
        match (&self.url, &self.data) {
            (Some(url), Some(data)) => Some((url.as_str(), data)),
            _ => None,
        }
    }

    /// Check invariants the serde schema cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.registry()?;

        if let Some(field) = self
            .fields
            .iter()
            .find(|f| f.field_type == FieldType::Select && f.options.is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "select field '{}' has no options",
                field.name
            )));
        }

        if self.url.is_some() != self.data.is_some() {
            log::warn!("Only one of url/data is configured; edits will not be persisted");
        }

        Ok(())
    }

    /// Build the field registry for these options.
    pub fn registry(&self) -> Result<FieldRegistry, ConfigError> {
        FieldRegistry::new(self.fields.clone()).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Parse JSON options. Lines starting with `//` are comments.
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        let options: Self =
            serde_json::from_str(&cleaned).map_err(|e| ConfigError::Parse(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Parse TOML options.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let options: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a file; `.toml` is TOML, anything else JSON.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Self::from_toml_str(&contents)
        } else {
            Self::from_json_str(&contents)
        }
    }

    /// Get the default options file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("celledit")
            .join("editor.json")
    }

    /// Load options from the default path, falling back to defaults
    pub fn load_or_default() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match Self::load(&path) {
            Ok(options) => options,
            Err(e) => {
                log::warn!("Error loading {}: {}", path.display(), e);
                log::warn!("Using default editor options");
                Self::default()
            }
        }
    }
}

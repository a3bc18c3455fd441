// Configuration loading

pub mod options;

pub use options::{ConfigError, EditorOptions, DEFAULT_TIMEOUT_MS};

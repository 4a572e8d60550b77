//! Worker configuration: the serde model and its TOML loader.
//!
//! Batch limits are carried exactly as configured; non-positive values are
//! resolved to defaults by the batching layer, not here.


use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to parse worker config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("worker config is missing a value for '{0}'")]
    MissingValue(&'static str),
}

///
/// WorkerConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    pub worker_name: String,
    pub worker_version: String,
    pub output_queue: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_queue: Option<String>,

    #[serde(default)]
    pub max_batch_size: i64,

    #[serde(default)]
    pub max_batch_time_ms: i64,

    #[serde(default)]
    pub enable_exception_on_failure: bool,

    #[serde(default)]
    pub input_message_processing: InputMessageProcessing,
}

impl WorkerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    /// Render back to TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("worker_name", &self.worker_name),
            ("worker_version", &self.worker_version),
            ("output_queue", &self.output_queue),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::MissingValue(*name));
        }
        if self
            .failure_queue
            .as_deref()
            .is_some_and(|queue| queue.trim().is_empty())
        {
            return Err(ConfigError::MissingValue("failure_queue"));
        }

        Ok(())
    }
}

///
/// InputMessageProcessing
///
/// Which task formats are accepted, and whether subdocuments are
/// processed as documents in their own right.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InputMessageProcessing {
    #[serde(default = "enabled")]
    pub document_tasks_accepted: bool,

    #[serde(default = "enabled")]
    pub field_enrichment_tasks_accepted: bool,

    #[serde(default = "enabled")]
    pub process_subdocuments_separately: bool,
}

impl Default for InputMessageProcessing {
    fn default() -> Self {
        Self {
            document_tasks_accepted: true,
            field_enrichment_tasks_accepted: true,
            process_subdocuments_separately: true,
        }
    }
}

const fn enabled() -> bool {
    true
}

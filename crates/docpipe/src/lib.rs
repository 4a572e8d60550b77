//! ## Crate layout
//! - `core`: document model, change-log replay and emission, the mutable
//!   document view, batch assembly, and task/worker processing.
//! - `config`: worker configuration and its TOML loader.
//! - `error`: the public error taxonomy.
//!
//! The `prelude` module carries the vocabulary used inside worker code.

pub use docpipe_config as config;
pub use docpipe_core as core;

pub mod error;

use crate::{config::WorkerConfig, core::settings::WorkerSettings};
use std::path::Path;

pub use error::{Error, ErrorKind, ErrorOrigin, InvalidTaskKind};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load worker settings from a TOML file.
pub fn load_settings(path: impl AsRef<Path>) -> Result<WorkerSettings, Error> {
    let config = WorkerConfig::from_path(path)?;

    Ok(WorkerSettings::from(&config))
}

/// Parse worker settings from TOML text.
pub fn settings_from_toml(source: &str) -> Result<WorkerSettings, Error> {
    let config = WorkerConfig::from_toml_str(source)?;

    Ok(WorkerSettings::from(&config))
}

///
/// Worker Prelude
///

pub mod prelude {
    pub use crate::core::{
        batch::Batch,
        hooks::{Admission, HookError, NoHooks, TaskHooks},
        prelude::*,
        runtime::{ResponseSink, TaskOutcome, TaskResponse, TaskStatus, WorkItem, WorkItemSource},
        settings::WorkerSettings,
        task::{JsonTaskDecoder, Task},
        worker::{BulkTaskProcessor, TaskProcessor, WorkerError},
    };
}

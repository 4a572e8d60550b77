//! Resolved per-worker settings consumed by task and batch processing.

use crate::batch::BatchSizeController;
use docpipe_config::WorkerConfig;

///
/// WorkerSettings
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorkerSettings {
    pub worker_name: String,
    pub worker_version: String,
    pub output_queue: String,
    pub failure_queue: Option<String>,
    pub enable_exception_on_failure: bool,
    pub process_subdocuments_separately: bool,
    pub document_tasks_accepted: bool,
    pub field_tasks_accepted: bool,
    pub batch: BatchSizeController,
}

impl WorkerSettings {
    /// Settings with every optional behaviour at its default.
    pub fn new(
        worker_name: impl Into<String>,
        worker_version: impl Into<String>,
        output_queue: impl Into<String>,
    ) -> Self {
        Self {
            worker_name: worker_name.into(),
            worker_version: worker_version.into(),
            output_queue: output_queue.into(),
            failure_queue: None,
            enable_exception_on_failure: false,
            process_subdocuments_separately: true,
            document_tasks_accepted: true,
            field_tasks_accepted: true,
            batch: BatchSizeController::default(),
        }
    }

    /// Name of the change-log entry this worker appends.
    #[must_use]
    pub fn change_log_entry_name(&self) -> String {
        format!("{}:{}", self.worker_name, self.worker_version)
    }

    /// Queue for responses that carry failures.
    #[must_use]
    pub fn failure_queue(&self) -> &str {
        self.failure_queue.as_deref().unwrap_or(&self.output_queue)
    }
}

impl From<&WorkerConfig> for WorkerSettings {
    fn from(config: &WorkerConfig) -> Self {
        let input = &config.input_message_processing;

        Self {
            worker_name: config.worker_name.clone(),
            worker_version: config.worker_version.clone(),
            output_queue: config.output_queue.clone(),
            failure_queue: config.failure_queue.clone(),
            enable_exception_on_failure: config.enable_exception_on_failure,
            process_subdocuments_separately: input.process_subdocuments_separately,
            document_tasks_accepted: input.document_tasks_accepted,
            field_tasks_accepted: input.field_enrichment_tasks_accepted,
            batch: BatchSizeController::new(config.max_batch_size, config.max_batch_time_ms),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn settings_follow_the_loaded_config() {
        let config = WorkerConfig::from_toml_str(
            r#"
            worker_name = "langdetect"
            worker_version = "2.1"
            output_queue = "out"
            failure_queue = "failed"
            max_batch_size = 8
            max_batch_time_ms = -1

            [input_message_processing]
            field_enrichment_tasks_accepted = false
            "#,
        )
        .expect("config");
        let settings = WorkerSettings::from(&config);

        assert_eq!(settings.change_log_entry_name(), "langdetect:2.1");
        assert_eq!(settings.failure_queue(), "failed");
        assert!(settings.document_tasks_accepted);
        assert!(!settings.field_tasks_accepted);
        assert_eq!(settings.batch.max_batch_size(), 8);
        assert_eq!(settings.batch.max_batch_time(), Duration::from_secs(180));
    }

    #[test]
    fn failure_queue_falls_back_to_output_queue() {
        let settings = WorkerSettings::new("w", "1", "out");

        assert_eq!(settings.failure_queue(), "out");
    }
}

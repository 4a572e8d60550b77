use docpipe::{ErrorKind, ErrorOrigin, core::batch::DEFAULT_MAX_BATCH_SIZE, settings_from_toml};
use std::time::Duration;

#[test]
fn settings_follow_the_config_file() {
    let settings = settings_from_toml(
        r#"
        worker_name = "ocr"
        worker_version = "2.1"
        output_queue = "ocr-out"
        max_batch_time_ms = 250
        enable_exception_on_failure = true

        [input_message_processing]
        process_subdocuments_separately = false
        "#,
    )
    .expect("valid config");

    assert_eq!(settings.change_log_entry_name(), "ocr:2.1");
    assert_eq!(settings.failure_queue(), "ocr-out");
    assert!(settings.enable_exception_on_failure);
    assert!(!settings.process_subdocuments_separately);
    assert_eq!(settings.batch.max_batch_size(), DEFAULT_MAX_BATCH_SIZE);
    assert_eq!(settings.batch.max_batch_time(), Duration::from_millis(250));
}

#[test]
fn broken_config_surfaces_as_config_error() {
    let err = settings_from_toml("worker_name = \"ocr\"\n").expect_err("missing fields");

    assert_eq!(err.kind, ErrorKind::Config);
    assert_eq!(err.origin, ErrorOrigin::Config);
    assert!(!err.is_retryable());
}

#[test]
fn missing_config_file_is_reported_with_its_path() {
    let err = docpipe::load_settings("/nonexistent/docpipe/worker.toml").expect_err("no file");

    assert_eq!(err.kind, ErrorKind::Config);
    assert!(err.message.contains("worker.toml"));
}

use std::time::Duration;

/// Documents per batch when the configured size is not positive.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// Batch window when the configured time is not positive.
pub const DEFAULT_MAX_BATCH_TIME: Duration = Duration::from_secs(180);

///
/// BatchSizeController
///
/// Size and time limits for one batch. Non-positive inputs select the
/// defaults; neither limit can be unbounded.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BatchSizeController {
    max_batch_size: usize,
    max_batch_time: Duration,
}

impl BatchSizeController {
    #[must_use]
    pub fn new(max_batch_size: i64, max_batch_time_ms: i64) -> Self {
        let max_batch_size = usize::try_from(max_batch_size)
            .ok()
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_MAX_BATCH_SIZE);
        let max_batch_time = u64::try_from(max_batch_time_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map_or(DEFAULT_MAX_BATCH_TIME, Duration::from_millis);

        Self {
            max_batch_size,
            max_batch_time,
        }
    }

    #[must_use]
    pub const fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    #[must_use]
    pub const fn max_batch_time(&self) -> Duration {
        self.max_batch_time
    }
}

impl Default for BatchSizeController {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_batch_time: DEFAULT_MAX_BATCH_TIME,
        }
    }
}

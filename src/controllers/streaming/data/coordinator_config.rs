use std::time::Duration;

const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_millis(300);
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(100);
const DEFAULT_CALL_THREADS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Minimum spacing between two session dispatches.
    pub throttle_interval: Duration,
    /// Upper bound on a single compute call; `None` waits indefinitely.
    pub call_timeout: Option<Duration>,
    /// Extra attempts for retryable network failures.
    pub max_retries: u32,
    pub retry_backoff: Duration,
    /// Threads that run backend calls. Calls abandoned after a cancel or a
    /// timeout keep their thread until the backend returns, so this also caps
    /// how many abandoned calls can be outstanding.
    pub call_threads: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            throttle_interval: DEFAULT_THROTTLE_INTERVAL,
            call_timeout: Some(DEFAULT_CALL_TIMEOUT),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            call_threads: DEFAULT_CALL_THREADS,
        }
    }
}

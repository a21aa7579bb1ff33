//! Runtime configuration for the remote store, sourced from the environment.

use std::time::Duration;

/// Configuration governing S3 listing/download retries, timeouts, and progress
/// batching.
///
/// Every field has a sane default so the engine runs against the public
/// buckets with zero configuration, and every field is independently
/// overridable from the environment (see `goes-engine::EngineConfig`, which
/// owns the actual env parsing and constructs this struct).
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// AWS region to address the public buckets in.
    pub region: String,
    /// Maximum attempts per object, including the first (`S3_RETRY_ATTEMPTS`).
    pub retry_attempts: u32,
    /// Base backoff duration; attempt `n` waits `base * 2^n` plus jitter
    /// (`S3_RETRY_BACKOFF_SECONDS`).
    pub retry_backoff_base: Duration,
    /// Connect timeout for listing and GET requests (`S3_CONNECT_TIMEOUT`).
    pub connect_timeout: Duration,
    /// Read timeout for listing and GET requests (`S3_READ_TIMEOUT`).
    pub read_timeout: Duration,
    /// Emit a progress update every this many completed downloads
    /// (`S3_PROGRESS_STEP`).
    pub progress_step: u64,
    /// Maximum concurrent downloads.
    pub max_workers: usize,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            retry_attempts: 5,
            retry_backoff_base: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(30),
            progress_step: 25,
            max_workers: 8,
        }
    }
}

impl RemoteConfig {
    /// Computes the backoff delay for `attempt` (1-based), exponential in
    /// `retry_backoff_base` with a deterministic ±25% jitter.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base_ms = u64::try_from(self.retry_backoff_base.as_millis()).unwrap_or(u64::MAX);
        let exp_delay = base_ms.saturating_mul(1u64 << attempt.min(10));
        let jitter_range = exp_delay / 4;
        let jitter = if jitter_range > 0 {
            let offset = (u64::from(attempt) * 17) % (jitter_range * 2);
            offset.saturating_sub(jitter_range)
        } else {
            0
        };
        let millis = i64::try_from(exp_delay).unwrap_or(i64::MAX) + jitter as i64;
        Duration::from_millis(u64::try_from(millis.max(100)).unwrap_or(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let config = RemoteConfig::default();
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.progress_step, 25);
    }

    #[test]
    fn backoff_grows_exponentially_and_is_bounded_below() {
        let config = RemoteConfig::default();
        let d1 = config.backoff_delay(1);
        let d2 = config.backoff_delay(2);
        assert!(d2 > d1);
        assert!(d1.as_millis() >= 100);
    }
}

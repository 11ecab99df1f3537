use model::env::{parsed_or, ConfigError};
use model::env::{
    DEFAULT_FAN_OUT_CONCURRENCY, DEFAULT_TIMEOUT_SECS, PIPELINE_FAN_OUT_CONCURRENCY,
    PIPELINE_TIMEOUT_SECS,
};
use std::time::Duration;

/// Tuning for a `TextPipeline`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// An execution still running after this long is failed.
    pub timeout: Duration,
    /// Language updates in flight at once. 1 applies them in detector order.
    pub fan_out_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            fan_out_concurrency: DEFAULT_FAN_OUT_CONCURRENCY,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs: u64 = parsed_or(PIPELINE_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS)?;
        let fan_out_concurrency: usize =
            parsed_or(PIPELINE_FAN_OUT_CONCURRENCY, DEFAULT_FAN_OUT_CONCURRENCY)?;

        if fan_out_concurrency == 0 {
            return Err(ConfigError::Invalid {
                name: PIPELINE_FAN_OUT_CONCURRENCY,
                value: fan_out_concurrency.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            timeout: Duration::from_secs(timeout_secs),
            fan_out_concurrency,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_fan_out_concurrency(mut self, fan_out_concurrency: usize) -> Self {
        self.fan_out_concurrency = fan_out_concurrency.max(1);
        self
    }
}

/// DynamoDB table holding one record per submitted text
pub const TEXT_TABLE_NAME: &str = "TEXT_TABLE_NAME";
/// Name of the table's partition key attribute
pub const TEXT_TABLE_PARTITION_KEY: &str = "TEXT_TABLE_PARTITION_KEY";
/// Whole-run timeout for a single execution, in seconds
pub const PIPELINE_TIMEOUT_SECS: &str = "PIPELINE_TIMEOUT_SECS";
/// Number of language updates allowed in flight during fan-out
pub const PIPELINE_FAN_OUT_CONCURRENCY: &str = "PIPELINE_FAN_OUT_CONCURRENCY";
/// Queue the gateway sends invocations to and the pipeline consumes
pub const PIPELINE_INPUT_QUEUE_URL: &str = "PIPELINE_INPUT_QUEUE_URL";
/// Name used as the prefix of every execution name
pub const PIPELINE_NAME: &str = "PIPELINE_NAME";
/// Identifier prefixed to execution names to build execution ARNs
pub const PIPELINE_ARN: &str = "PIPELINE_ARN";
/// Request body field carrying the text
pub const TEXT_FIELD_NAME: &str = "TEXT_FIELD_NAME";

pub const DEFAULT_PARTITION_KEY: &str = "txt";
pub const DEFAULT_TEXT_FIELD_NAME: &str = "txt";
pub const DEFAULT_PIPELINE_NAME: &str = "TextStateMachine";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_FAN_OUT_CONCURRENCY: usize = 1;

/// Errors arising from reading configuration out of the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing {0} environment variable")]
    Missing(&'static str),
    #[error("Invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Read a required variable.
pub fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}

/// Read an optional variable, falling back to `default` when unset.
pub fn or_default(name: &'static str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Read and parse an optional variable, falling back to `default` when unset.
pub fn parsed_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value.parse().map_err(|err: T::Err| ConfigError::Invalid {
            name,
            reason: err.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

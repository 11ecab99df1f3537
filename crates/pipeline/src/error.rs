use detector::DetectionError;
use std::time::Duration;
use store::StoreError;

/// Why an execution ended in the `Failed` state.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The initial write failed, nothing was detected
    #[error("Seed failed: {0}")]
    Seed(#[source] StoreError),

    /// The detector failed, the seeded record has no languages
    #[error("Detection failed: {0}")]
    Detection(#[source] DetectionError),

    /// A language update failed and the remaining updates were abandoned
    #[error("Update of language {language_code} failed: {source}")]
    Update {
        language_code: String,
        #[source]
        source: StoreError,
    },

    #[error("Execution timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The task running the execution was cancelled or panicked
    #[error("Execution interrupted: {0}")]
    Interrupted(String),
}

use ::model::Error;
use async_trait::async_trait;
use model::{LanguageScore, TextRecord};
use std::fmt::{Debug, Display, Formatter};

/// Store the text records written by the pipeline.
///
/// Records are keyed by the submitted text. A record is created by `put_text`
/// and then receives one attribute per detected language.
#[async_trait]
pub trait TextStore: Send + Sync {
    /// Create or replace the record for `key` with no language data.
    async fn put_text(&self, key: &str) -> Result<(), StoreError>;

    /// Set the attribute named by the language code to the formatted score.
    /// Fails with `MissingEntry` if `put_text` was never called for `key`.
    async fn update_language(&self, key: &str, score: &LanguageScore) -> Result<(), StoreError>;

    async fn get_text(&self, key: &str) -> Result<Option<TextRecord>, StoreError>;
}

/// Errors arising from reading or writing records.
#[derive(Debug)]
pub struct StoreError {
    pub key: String,

    pub operation: StoreOperation,
    pub reason: StoreErrorReason,
}

#[derive(Debug)]
pub enum StoreErrorReason {
    // The record to update doesn't exist
    MissingEntry,
    // The stored record was not of the expected shape
    BadState(String),
    // An error from the underlying store
    BackendFailure(Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    PutText,
    UpdateLanguage,
    GetText,
}

impl StoreError {
    pub fn new(key: impl Into<String>, operation: StoreOperation, reason: StoreErrorReason) -> Self {
        StoreError {
            key: key.into(),
            operation,
            reason,
        }
    }

    pub fn is_missing_entry(&self) -> bool {
        matches!(self.reason, StoreErrorReason::MissingEntry)
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            StoreErrorReason::MissingEntry => {
                write!(f, "{:?} failed: no record for key {:?}", self.operation, self.key)
            }
            StoreErrorReason::BadState(reason) => {
                write!(f, "{:?} failed: bad record for key {:?}: {reason}", self.operation, self.key)
            }
            StoreErrorReason::BackendFailure(err) => {
                write!(f, "{:?} failed for key {:?}: {err}", self.operation, self.key)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.reason {
            StoreErrorReason::BackendFailure(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_operation_and_key() {
        let err = StoreError::new("hello", StoreOperation::UpdateLanguage, StoreErrorReason::MissingEntry);

        assert!(err.is_missing_entry());
        assert_eq!(
            "UpdateLanguage failed: no record for key \"hello\"",
            err.to_string()
        );
    }
}

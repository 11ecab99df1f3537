use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod env;
pub mod invocation;
pub mod precision;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Number of significant digits kept when persisting a score.
pub const SCORE_PRECISION: usize = 2;

/// This id is used for tracing and storage.
pub trait InvocationId {
    fn invocation_id(&self) -> &str;
}

/// Validated input to the pipeline.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TextSubmission {
    pub text: String,
}

impl From<&str> for TextSubmission {
    fn from(text: &str) -> Self {
        TextSubmission {
            text: text.to_string(),
        }
    }
}

/// One language as returned by the detector, ranked by the detector's confidence.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LanguageScore {
    pub language_code: String,
    pub score: f64,
}

impl LanguageScore {
    pub fn new(language_code: impl Into<String>, score: f64) -> Self {
        Self {
            language_code: language_code.into(),
            score,
        }
    }

    /// The score as it is persisted.
    pub fn formatted_score(&self) -> String {
        precision::to_precision(self.score, SCORE_PRECISION)
    }
}

/// A stored text and the languages detected in it.
///
/// Language codes are attribute names on the stored record, so they are
/// kept as a map from code to formatted score rather than a fixed schema.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct TextRecord {
    pub key: String,
    pub languages: BTreeMap<String, String>,
}

impl TextRecord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            languages: BTreeMap::new(),
        }
    }

    pub fn score(&self, language_code: &str) -> Option<&str> {
        self.languages.get(language_code).map(String::as_str)
    }
}

/// Returned as soon as an execution has been started.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionHandle {
    pub execution_arn: String,
    pub start_date: DateTime<Utc>,
}

use async_trait::async_trait;
use model::{Error, LanguageScore};

/// Detects the dominant languages of a text.
///
/// Implementations pass the text through to the detection service unmodified,
/// including empty text, and return the languages in the service's ranking.
/// An empty result is valid.
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    fn name(&self) -> &'static str;

    async fn detect(&self, text: &str) -> Result<Vec<LanguageScore>, DetectionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    /// The detection service rejected the request or failed
    #[error("{service} failed: {message}")]
    Service {
        service: &'static str,
        message: String,
        #[source]
        source: Option<Error>,
    },
    /// The service answered with something that isn't a language ranking
    #[error("{service} returned an invalid response: {message}")]
    BadResponse { service: &'static str, message: String },
}

impl DetectionError {
    pub fn service(service: &'static str, message: impl Into<String>, source: Option<Error>) -> Self {
        DetectionError::Service {
            service,
            message: message.into(),
            source,
        }
    }
}

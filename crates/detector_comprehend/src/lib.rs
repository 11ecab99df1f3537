use async_trait::async_trait;
use aws_sdk_comprehend::error::ProvideErrorMetadata;
use aws_sdk_comprehend::operation::detect_dominant_language::DetectDominantLanguageOutput;
use aws_sdk_comprehend::types::DominantLanguage;
use detector::{DetectionError, LanguageDetector};
use lambda_runtime::tracing;
use model::LanguageScore;

const SERVICE_NAME: &str = "Comprehend";

/// Detects languages with Amazon Comprehend `DetectDominantLanguage`.
#[derive(Clone)]
pub struct ComprehendDetector {
    comprehend_client: aws_sdk_comprehend::Client,
}

impl ComprehendDetector {
    pub fn new(comprehend_client: aws_sdk_comprehend::Client) -> Self {
        Self { comprehend_client }
    }
}

#[async_trait]
impl LanguageDetector for ComprehendDetector {
    fn name(&self) -> &'static str {
        SERVICE_NAME
    }

    async fn detect(&self, text: &str) -> Result<Vec<LanguageScore>, DetectionError> {
        let output: DetectDominantLanguageOutput = self
            .comprehend_client
            .detect_dominant_language()
            .text(text)
            .send()
            .await
            .map_err(|err| {
                let message: String = err
                    .as_service_error()
                    .and_then(|service_err| service_err.message())
                    .map(str::to_string)
                    .unwrap_or_else(|| err.to_string());

                DetectionError::service(SERVICE_NAME, message, Some(err.into()))
            })?;

        to_scores(output.languages())
    }
}

fn to_scores(languages: &[DominantLanguage]) -> Result<Vec<LanguageScore>, DetectionError> {
    languages
        .iter()
        .filter_map(|language| match language.language_code() {
            Some(code) => Some((code, language.score().unwrap_or_default())),
            None => {
                tracing::warn!("Skipping detected language without a code");

                None
            }
        })
        .map(|(code, score)| {
            let score: f64 = f64::from(score);

            if !(0.0..=1.0).contains(&score) {
                return Err(DetectionError::BadResponse {
                    service: SERVICE_NAME,
                    message: format!("score {score} for {code} is outside [0, 1]"),
                });
            }

            Ok(LanguageScore::new(code, score))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_comprehend::operation::detect_dominant_language::DetectDominantLanguageError;
    use aws_sdk_comprehend::error::ErrorMetadata;
    use aws_sdk_comprehend::types::error::TextSizeLimitExceededException;
    use aws_smithy_mocks::{mock, mock_client, Rule};

    fn language(code: &str, score: f32) -> DominantLanguage {
        DominantLanguage::builder()
            .language_code(code)
            .score(score)
            .build()
    }

    #[tokio::test]
    async fn detect_keeps_service_ranking() {
        let detect_rule: Rule = mock!(aws_sdk_comprehend::Client::detect_dominant_language)
            .match_requests(|req| req.text() == Some("hello, olá"))
            .then_output(|| {
                DetectDominantLanguageOutput::builder()
                    .languages(language("en", 0.71))
                    .languages(language("pt", 0.27))
                    .build()
            });

        let detector = ComprehendDetector::new(mock_client!(aws_sdk_comprehend, [&detect_rule]));

        let scores: Vec<LanguageScore> = detector
            .detect("hello, olá")
            .await
            .expect("detection should succeed");

        let codes: Vec<&str> = scores.iter().map(|s| s.language_code.as_str()).collect();

        assert_eq!(vec!["en", "pt"], codes);
        assert_eq!("0.71", scores[0].formatted_score());
    }

    #[tokio::test]
    async fn detect_accepts_empty_ranking() {
        let detect_rule: Rule = mock!(aws_sdk_comprehend::Client::detect_dominant_language)
            .then_output(|| DetectDominantLanguageOutput::builder().build());

        let detector = ComprehendDetector::new(mock_client!(aws_sdk_comprehend, [&detect_rule]));

        let scores: Vec<LanguageScore> = detector.detect("").await.expect("empty is valid");

        assert!(scores.is_empty());
    }

    #[tokio::test]
    async fn detect_surfaces_service_message() {
        let detect_rule: Rule = mock!(aws_sdk_comprehend::Client::detect_dominant_language)
            .then_error(|| {
                DetectDominantLanguageError::TextSizeLimitExceededException(
                    TextSizeLimitExceededException::builder()
                        .message("Input text size exceeds limit")
                        .meta(
                            ErrorMetadata::builder()
                                .code("TextSizeLimitExceededException")
                                .message("Input text size exceeds limit")
                                .build(),
                        )
                        .build(),
                )
            });

        let detector = ComprehendDetector::new(mock_client!(aws_sdk_comprehend, [&detect_rule]));

        let err: DetectionError = detector.detect("too long").await.expect_err("should fail");

        assert_eq!(
            "Comprehend failed: Input text size exceeds limit",
            err.to_string()
        );
    }

    #[test]
    fn languages_without_code_are_skipped() {
        let languages: Vec<DominantLanguage> = vec![
            DominantLanguage::builder().score(0.5).build(),
            language("fr", 0.5),
        ];

        let scores: Vec<LanguageScore> = to_scores(&languages).unwrap();

        assert_eq!(vec![LanguageScore::new("fr", 0.5)], scores);
    }

    #[test]
    fn out_of_range_score_is_bad_response() {
        let result = to_scores(&[language("en", 1.5)]);

        assert!(matches!(result, Err(DetectionError::BadResponse { .. })));
    }
}

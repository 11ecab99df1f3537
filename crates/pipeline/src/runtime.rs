use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::execution::{ExecutionReport, ExecutionState, ExecutionTracker};
use chrono::Utc;
use detector::LanguageDetector;
use futures::StreamExt;
use lambda_runtime::tracing;
use lambda_runtime::tracing::{Instrument, Span};
use model::invocation::PipelineInvocation;
use model::LanguageScore;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;
use store::TextStore;

/// Seeds a record for the submitted text, detects its languages and writes a
/// score per language back onto the record.
///
/// Each phase only runs if the previous one succeeded. There are no retries:
/// a failed execution is terminal and re-submitting the text is the way to
/// recover.
pub struct TextPipeline {
    store: Arc<dyn TextStore>,
    detector: Arc<dyn LanguageDetector>,
    config: PipelineConfig,
}

impl TextPipeline {
    pub fn new(
        store: Arc<dyn TextStore>,
        detector: Arc<dyn LanguageDetector>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            detector,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run an execution, failing it once the configured timeout has passed
    /// since its start date.
    pub async fn run_with_timeout(
        &self,
        invocation: &PipelineInvocation,
    ) -> Result<ExecutionReport, PipelineError> {
        let span: Span = tracing::span!(
            tracing::Level::INFO,
            "Execution",
            execution_name = invocation.execution_name.as_str()
        );

        // Time spent queued counts against the timeout
        let elapsed: Duration = (Utc::now() - invocation.start_date)
            .to_std()
            .unwrap_or_default();
        let remaining: Duration = self.config.timeout.saturating_sub(elapsed);

        let result: Result<ExecutionReport, PipelineError> = if remaining.is_zero() {
            Err(PipelineError::Timeout(self.config.timeout))
        } else {
            tokio::time::timeout(remaining, self.run(invocation).instrument(span.clone()))
                .await
                .unwrap_or(Err(PipelineError::Timeout(self.config.timeout)))
        };

        span.in_scope(|| match &result {
            Ok(report) => tracing::info!("Completed execution {}", report.to_json()),
            Err(err) => tracing::error!("Execution failed: {err}"),
        });

        result
    }

    /// Run an execution to completion with no timeout.
    pub async fn run(
        &self,
        invocation: &PipelineInvocation,
    ) -> Result<ExecutionReport, PipelineError> {
        let key: &str = invocation.input.text.as_str();
        let mut tracker: ExecutionTracker = ExecutionTracker::start();

        match self.execute(key, &mut tracker).await {
            Ok(languages_updated) => Ok(ExecutionReport {
                execution_name: invocation.execution_name.clone(),
                key: key.to_string(),
                languages_updated,
                state: tracker.state(),
            }),
            Err(err) => {
                tracker.advance(ExecutionState::Failed);

                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        key: &str,
        tracker: &mut ExecutionTracker,
    ) -> Result<Vec<String>, PipelineError> {
        self.store.put_text(key).await.map_err(PipelineError::Seed)?;
        tracker.advance(ExecutionState::Seeded);

        let scores: Vec<LanguageScore> = self
            .detector
            .detect(key)
            .await
            .map_err(PipelineError::Detection)?;
        tracker.advance(ExecutionState::Detected {
            languages: scores.len(),
        });

        tracing::debug!(
            detector = self.detector.name(),
            languages = scores.len(),
            "Detected languages"
        );

        // Results come back in detector order; the first error drops the
        // remaining updates, including any still in flight
        let pending: Vec<_> = scores
            .iter()
            .map(|score| self.update_language(key, score))
            .collect();
        let mut updates =
            pin!(futures::stream::iter(pending).buffered(self.config.fan_out_concurrency.max(1)));

        let mut languages_updated: Vec<String> = Vec::with_capacity(scores.len());

        while let Some(language_code) = updates.next().await.transpose()? {
            languages_updated.push(language_code);
            tracker.advance(ExecutionState::Updated {
                count: languages_updated.len(),
            });
        }

        tracker.advance(ExecutionState::Completed);

        Ok(languages_updated)
    }

    async fn update_language(&self, key: &str, score: &LanguageScore) -> Result<String, PipelineError> {
        self.store
            .update_language(key, score)
            .await
            .map_err(|source| PipelineError::Update {
                language_code: score.language_code.clone(),
                source,
            })?;

        Ok(score.language_code.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::TextRecord;
    use store_in_memory::InMemoryTextStore;
    use test_utils::{
        invocation_for, FailingDetector, FixedDetector, RecordingStore, SlowDetector, StoreCall,
    };

    fn pipeline(store: Arc<dyn TextStore>, detector: Arc<dyn LanguageDetector>) -> TextPipeline {
        TextPipeline::new(store, detector, PipelineConfig::default())
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn execution_can_be_spawned() {
        let pipeline = pipeline(
            Arc::new(InMemoryTextStore::default()),
            Arc::new(FixedDetector::new(vec![LanguageScore::new("en", 0.98)])),
        );
        let invocation: PipelineInvocation = invocation_for("hello world");

        assert_send(&pipeline.run_with_timeout(&invocation));
    }

    #[tokio::test]
    async fn hello_world_is_stored_with_english_score() {
        let store: InMemoryTextStore = InMemoryTextStore::default();
        let detector = FixedDetector::new(vec![LanguageScore::new("en", 0.98)]);

        let report: ExecutionReport = pipeline(Arc::new(store.clone()), Arc::new(detector))
            .run_with_timeout(&invocation_for("hello world"))
            .await
            .expect("execution should complete");

        let record: TextRecord = store.get_text("hello world").await.unwrap().unwrap();

        assert_eq!("hello world", record.key);
        assert_eq!(Some("0.98"), record.score("en"));
        assert_eq!(ExecutionState::Completed, report.state);
        assert_eq!(vec!["en".to_string()], report.languages_updated);
    }

    #[tokio::test]
    async fn one_update_per_detected_language() {
        let store = RecordingStore::default();
        let detector = FixedDetector::new(vec![
            LanguageScore::new("pt", 0.8765),
            LanguageScore::new("es", 0.1234),
            LanguageScore::new("gl", 0.0001),
        ]);

        pipeline(Arc::new(store.clone()), Arc::new(detector))
            .run(&invocation_for("bom dia"))
            .await
            .expect("execution should complete");

        assert_eq!(
            vec![
                StoreCall::Put("bom dia".to_string()),
                StoreCall::Update("bom dia".to_string(), "pt".to_string(), "0.88".to_string()),
                StoreCall::Update("bom dia".to_string(), "es".to_string(), "0.12".to_string()),
                StoreCall::Update("bom dia".to_string(), "gl".to_string(), "0.00010".to_string()),
            ],
            store.calls()
        );
    }

    #[tokio::test]
    async fn empty_detection_completes_without_updates() {
        let store = RecordingStore::default();

        let report: ExecutionReport = pipeline(Arc::new(store.clone()), Arc::new(FixedDetector::empty()))
            .run(&invocation_for("?"))
            .await
            .expect("empty detection is valid");

        assert_eq!(vec![StoreCall::Put("?".to_string())], store.calls());
        assert!(report.languages_updated.is_empty());
        assert_eq!(ExecutionState::Completed, report.state);
    }

    #[tokio::test]
    async fn rerun_with_same_input_is_idempotent() {
        let store: InMemoryTextStore = InMemoryTextStore::default();
        let detector = FixedDetector::new(vec![
            LanguageScore::new("en", 0.61),
            LanguageScore::new("de", 0.39),
        ]);
        let pipeline = pipeline(Arc::new(store.clone()), Arc::new(detector));

        pipeline.run(&invocation_for("hallo world")).await.unwrap();
        let first: TextRecord = store.get_text("hallo world").await.unwrap().unwrap();

        pipeline.run(&invocation_for("hallo world")).await.unwrap();
        let second: TextRecord = store.get_text("hallo world").await.unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(1, store.len());
    }

    #[tokio::test]
    async fn detection_failure_leaves_key_only_record() {
        let store: InMemoryTextStore = InMemoryTextStore::default();

        let err: PipelineError = pipeline(Arc::new(store.clone()), Arc::new(FailingDetector))
            .run(&invocation_for("hello world"))
            .await
            .expect_err("execution should fail");

        let record: TextRecord = store.get_text("hello world").await.unwrap().unwrap();

        assert!(matches!(err, PipelineError::Detection(_)));
        assert_eq!(TextRecord::new("hello world"), record);
    }

    #[tokio::test]
    async fn seed_failure_skips_detection() {
        let store = RecordingStore::default().fail_puts();
        let detector = FixedDetector::new(vec![LanguageScore::new("en", 0.98)]);

        let err: PipelineError = pipeline(Arc::new(store.clone()), Arc::new(detector.clone()))
            .run(&invocation_for("hello world"))
            .await
            .expect_err("execution should fail");

        assert!(matches!(err, PipelineError::Seed(_)));
        assert_eq!(0, detector.calls());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn update_failure_abandons_remaining_languages() {
        let store = RecordingStore::default().fail_updates_for("es");
        let detector = FixedDetector::new(vec![
            LanguageScore::new("pt", 0.7),
            LanguageScore::new("es", 0.2),
            LanguageScore::new("gl", 0.1),
        ]);

        let err: PipelineError = pipeline(Arc::new(store.clone()), Arc::new(detector))
            .run(&invocation_for("bom dia"))
            .await
            .expect_err("execution should fail");

        match err {
            PipelineError::Update { language_code, .. } => assert_eq!("es", language_code),
            other => panic!("unexpected error {other:?}"),
        }

        let record: TextRecord = store.get_text("bom dia").await.unwrap().unwrap();

        assert_eq!(Some("0.70"), record.score("pt"));
        assert_eq!(None, record.score("gl"));
    }

    #[tokio::test]
    async fn concurrent_fan_out_writes_every_language() {
        let store: InMemoryTextStore = InMemoryTextStore::default();
        let detector = FixedDetector::new(vec![
            LanguageScore::new("en", 0.5),
            LanguageScore::new("fr", 0.3),
            LanguageScore::new("it", 0.2),
        ]);
        let config: PipelineConfig = PipelineConfig::default().with_fan_out_concurrency(3);

        let report: ExecutionReport = TextPipeline::new(Arc::new(store.clone()), Arc::new(detector), config)
            .run(&invocation_for("ciao"))
            .await
            .unwrap();

        let record: TextRecord = store.get_text("ciao").await.unwrap().unwrap();

        assert_eq!(vec!["en", "fr", "it"], report.languages_updated);
        assert_eq!(3, record.languages.len());
    }

    #[tokio::test]
    async fn slow_execution_times_out() {
        let store: InMemoryTextStore = InMemoryTextStore::default();
        let detector = SlowDetector::new(Duration::from_secs(5));
        let config: PipelineConfig = PipelineConfig::default().with_timeout(Duration::from_millis(50));

        let err: PipelineError = TextPipeline::new(Arc::new(store.clone()), Arc::new(detector), config)
            .run_with_timeout(&invocation_for("hello world"))
            .await
            .expect_err("execution should time out");

        assert!(matches!(err, PipelineError::Timeout(_)));
    }

    #[tokio::test]
    async fn time_spent_queued_counts_against_timeout() {
        let store = RecordingStore::default();
        let mut invocation: PipelineInvocation = invocation_for("hello world");
        invocation.start_date = Utc::now() - chrono::Duration::minutes(10);

        let err: PipelineError = pipeline(Arc::new(store.clone()), Arc::new(FixedDetector::empty()))
            .run_with_timeout(&invocation)
            .await
            .expect_err("execution should time out");

        assert!(matches!(err, PipelineError::Timeout(_)));
        assert!(store.calls().is_empty());
    }
}

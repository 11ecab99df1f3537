use async_trait::async_trait;
use aws_lambda_events::sqs::SqsMessageObj;
use aws_sdk_sqs::operation::send_message::SendMessageOutput;
use aws_smithy_mocks::{mock, mock_client, Rule};
use chrono::Utc;
use detector::{DetectionError, LanguageDetector};
use model::env::{PIPELINE_INPUT_QUEUE_URL, TEXT_TABLE_NAME};
use model::invocation::PipelineInvocation;
use model::{LanguageScore, TextRecord, TextSubmission};
use serde::Serialize;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use store::StoreErrorReason::BackendFailure;
use store::StoreOperation::{PutText, UpdateLanguage};
use store::{StoreError, TextStore};
use store_in_memory::InMemoryTextStore;

/// Test queue and table values
pub const TEST_INPUT_QUEUE: &str = "input_queue";
pub const TEST_TABLE: &str = "TextTable";
pub const TEST_PIPELINE_ARN: &str = "arn:aws:states:us-east-1:000000000000:stateMachine:TestStateMachine";

static EXECUTION_COUNT: AtomicUsize = AtomicUsize::new(0);

/// Create a dummy SQS message with a set body
pub fn sqs_message_with_body<T>(body: T) -> SqsMessageObj<T>
where
    T: Serialize + Clone,
{
    SqsMessageObj {
        message_id: None,
        receipt_handle: None,
        body,
        md5_of_body: None,
        md5_of_message_attributes: None,
        attributes: Default::default(),
        message_attributes: Default::default(),
        event_source_arn: None,
        event_source: None,
        aws_region: None,
    }
}

/// An invocation for `text` with a unique execution name, started now.
pub fn invocation_for(text: &str) -> PipelineInvocation {
    let count: usize = EXECUTION_COUNT.fetch_add(1, Ordering::Relaxed);

    PipelineInvocation::new(
        TEST_PIPELINE_ARN,
        format!("TestStateMachine-{count}"),
        Utc::now(),
        TextSubmission::from(text),
    )
}

/// A default mock SQS client which returns an empty response
pub fn create_mock_sqs_client() -> aws_sdk_sqs::Client {
    let send_message_rule: Rule = mock!(aws_sdk_sqs::Client::send_message)
        .match_requests(|_| true)
        .sequence()
        .output(|| SendMessageOutput::builder().build())
        .repeatedly()
        .build();

    mock_client!(aws_sdk_sqs, [&send_message_rule])
}

/// Setup default environment variables used in testing
pub fn setup_default_env() {
    unsafe {
        env::set_var(PIPELINE_INPUT_QUEUE_URL, TEST_INPUT_QUEUE);
        env::set_var(TEXT_TABLE_NAME, TEST_TABLE);
    }
}

/// Always answers with the same ranking and counts how often it was asked.
#[derive(Clone, Default)]
pub struct FixedDetector {
    scores: Vec<LanguageScore>,
    calls: Arc<AtomicUsize>,
}

impl FixedDetector {
    pub fn new(scores: Vec<LanguageScore>) -> Self {
        Self {
            scores,
            calls: Default::default(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LanguageDetector for FixedDetector {
    fn name(&self) -> &'static str {
        "FixedDetector"
    }

    async fn detect(&self, _text: &str) -> Result<Vec<LanguageScore>, DetectionError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        Ok(self.scores.clone())
    }
}

/// Always fails as if the service were unavailable.
pub struct FailingDetector;

#[async_trait]
impl LanguageDetector for FailingDetector {
    fn name(&self) -> &'static str {
        "FailingDetector"
    }

    async fn detect(&self, _text: &str) -> Result<Vec<LanguageScore>, DetectionError> {
        Err(DetectionError::service(
            self.name(),
            "Service unavailable",
            None,
        ))
    }
}

/// Sleeps before answering with an empty ranking.
pub struct SlowDetector {
    delay: Duration,
}

impl SlowDetector {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl LanguageDetector for SlowDetector {
    fn name(&self) -> &'static str {
        "SlowDetector"
    }

    async fn detect(&self, _text: &str) -> Result<Vec<LanguageScore>, DetectionError> {
        tokio::time::sleep(self.delay).await;

        Ok(Vec::new())
    }
}

/// A successful call made against a `RecordingStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Put(String),
    /// Key, language code and formatted score
    Update(String, String, String),
}

/// An in-memory store which records successful writes and can be told to fail.
#[derive(Clone, Default)]
pub struct RecordingStore {
    inner: InMemoryTextStore,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    fail_puts: bool,
    fail_updates_for: Option<String>,
}

impl RecordingStore {
    pub fn fail_puts(mut self) -> Self {
        self.fail_puts = true;
        self
    }

    pub fn fail_updates_for(mut self, language_code: &str) -> Self {
        self.fail_updates_for = Some(language_code.to_string());
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TextStore for RecordingStore {
    async fn put_text(&self, key: &str) -> Result<(), StoreError> {
        if self.fail_puts {
            return Err(StoreError::new(key, PutText, BackendFailure("put rejected".into())));
        }

        self.inner.put_text(key).await?;
        self.record(StoreCall::Put(key.to_string()));

        Ok(())
    }

    async fn update_language(&self, key: &str, score: &LanguageScore) -> Result<(), StoreError> {
        if self.fail_updates_for.as_deref() == Some(score.language_code.as_str()) {
            return Err(StoreError::new(
                key,
                UpdateLanguage,
                BackendFailure("update rejected".into()),
            ));
        }

        self.inner.update_language(key, score).await?;
        self.record(StoreCall::Update(
            key.to_string(),
            score.language_code.clone(),
            score.formatted_score(),
        ));

        Ok(())
    }

    async fn get_text(&self, key: &str) -> Result<Option<TextRecord>, StoreError> {
        self.inner.get_text(key).await
    }
}

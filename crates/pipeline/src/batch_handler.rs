use crate::error::PipelineError;
use crate::execution::ExecutionReport;
use crate::runtime::TextPipeline;
use aws_lambda_events::sqs::{SqsBatchResponse, SqsEventObj, SqsMessageObj};
use lambda_runtime::tracing::instrument::Instrumented;
use lambda_runtime::tracing::{Instrument, Span};
use lambda_runtime::{tracing, Error, LambdaEvent};
use model::InvocationId;
use model::invocation::PipelineInvocation;

/// Run one execution per SQS message, concurrently.
///
/// Failed executions are terminal. They are logged but never reported back as
/// batch item failures, since redelivery would retry them.
pub async fn handle_sqs_batch(
    pipeline: &TextPipeline,
    event: LambdaEvent<SqsEventObj<PipelineInvocation>>,
) -> Result<SqsBatchResponse, Error> {
    let records: Vec<SqsMessageObj<PipelineInvocation>> = event.payload.records;

    tracing::info!("Handling batch of [{}] from SQS", records.len());

    let tasks: Vec<Instrumented<_>> = records
        .into_iter()
        .map(|message: SqsMessageObj<PipelineInvocation>| {
            let message_id: String = message.message_id.unwrap_or_default();
            let invocation: PipelineInvocation = message.body;

            let message_span: Span = tracing::span!(
                tracing::Level::INFO,
                "SQS Handler",
                message_id,
                execution = invocation.invocation_id()
            );

            async move { pipeline.run_with_timeout(&invocation).await }.instrument(message_span)
        })
        .collect();

    let results: Vec<Result<ExecutionReport, PipelineError>> =
        futures::future::join_all(tasks).await;

    let failed: usize = results.iter().filter(|result| result.is_err()).count();

    tracing::info!(
        "Finished batch, {} completed and {} failed",
        results.len() - failed,
        failed
    );

    Ok(SqsBatchResponse::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use lambda_runtime::Context;
    use model::{LanguageScore, TextRecord};
    use std::sync::Arc;
    use store::TextStore;
    use test_utils::{invocation_for, sqs_message_with_body, FixedDetector, RecordingStore};

    #[tokio::test]
    async fn batch_runs_every_invocation() {
        let store = RecordingStore::default();
        let detector = FixedDetector::new(vec![LanguageScore::new("en", 0.98)]);
        let pipeline = TextPipeline::new(
            Arc::new(store.clone()),
            Arc::new(detector),
            PipelineConfig::default(),
        );

        let event: LambdaEvent<SqsEventObj<PipelineInvocation>> = LambdaEvent::new(
            SqsEventObj {
                records: vec![
                    sqs_message_with_body(invocation_for("hello world")),
                    sqs_message_with_body(invocation_for("good morning")),
                ],
            },
            Context::default(),
        );

        let response: SqsBatchResponse = handle_sqs_batch(&pipeline, event)
            .await
            .expect("batch should be handled");

        assert!(response.batch_item_failures.is_empty());

        for text in ["hello world", "good morning"] {
            let record: TextRecord = store.get_text(text).await.unwrap().unwrap();

            assert_eq!(Some("0.98"), record.score("en"));
        }
    }

    #[tokio::test]
    async fn failed_executions_are_not_redelivered() {
        let store = RecordingStore::default().fail_updates_for("en");
        let detector = FixedDetector::new(vec![LanguageScore::new("en", 0.98)]);
        let pipeline = TextPipeline::new(
            Arc::new(store.clone()),
            Arc::new(detector),
            PipelineConfig::default(),
        );

        let event: LambdaEvent<SqsEventObj<PipelineInvocation>> = LambdaEvent::new(
            SqsEventObj {
                records: vec![sqs_message_with_body(invocation_for("hello world"))],
            },
            Context::default(),
        );

        let response: SqsBatchResponse = handle_sqs_batch(&pipeline, event)
            .await
            .expect("batch should be handled");

        assert!(response.batch_item_failures.is_empty());
    }
}

use aws_config::{BehaviorVersion, SdkConfig};
use detector_comprehend::ComprehendDetector;
use lambda_runtime::{Error, service_fn, tracing};
use pipeline::{PipelineConfig, PipelineLambdaEvent, TextPipeline, handle_sqs_batch};
use std::sync::Arc;
use store_dynamodb::DynamoDbTextStore;

/// Consumes invocations from the pipeline queue and runs one execution per message.
#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let aws_config: SdkConfig = aws_config::load_defaults(BehaviorVersion::latest()).await;

    let store: DynamoDbTextStore =
        DynamoDbTextStore::from_env(aws_sdk_dynamodb::Client::new(&aws_config))?;
    let detector: ComprehendDetector =
        ComprehendDetector::new(aws_sdk_comprehend::Client::new(&aws_config));

    let pipeline: TextPipeline =
        TextPipeline::new(Arc::new(store), Arc::new(detector), PipelineConfig::from_env()?);
    let pipeline: &TextPipeline = &pipeline;

    tracing::info!(
        timeout_secs = pipeline.config().timeout.as_secs(),
        fan_out_concurrency = pipeline.config().fan_out_concurrency,
        "Starting text pipeline"
    );

    lambda_runtime::run(service_fn(move |event: PipelineLambdaEvent| async move {
        handle_sqs_batch(pipeline, event).await
    }))
    .await
}

use aws_lambda_events::sqs::SqsEventObj;
use lambda_runtime::LambdaEvent;
use model::invocation::PipelineInvocation;

pub mod batch_handler;
pub mod config;
pub mod error;
pub mod execution;
pub mod runtime;
pub mod starter;

pub use batch_handler::handle_sqs_batch;
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use execution::{ExecutionReport, ExecutionState};
pub use runtime::TextPipeline;
pub use starter::{ExecutionStarter, SpawnedExecutions, SqsExecutionStarter, StartError};

/// The event the pipeline function receives from its input queue.
///
/// ```ignore
/// use lambda_runtime::service_fn;
/// use pipeline::{handle_sqs_batch, PipelineLambdaEvent, TextPipeline};
///
/// let pipeline: &TextPipeline = &pipeline;
///
/// lambda_runtime::run(service_fn(move |event: PipelineLambdaEvent| async move {
///     handle_sqs_batch(pipeline, event).await
/// }))
/// .await
/// ```
pub type PipelineLambdaEvent = LambdaEvent<SqsEventObj<PipelineInvocation>>;

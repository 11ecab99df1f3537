use crate::error::PipelineError;
use crate::execution::ExecutionReport;
use crate::runtime::TextPipeline;
use async_trait::async_trait;
use aws_sdk_sqs::error::ProvideErrorMetadata;
use lambda_runtime::tracing;
use model::env::{required, ConfigError, PIPELINE_INPUT_QUEUE_URL};
use model::invocation::PipelineInvocation;
use model::{Error, ExecutionHandle};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Starts an execution and returns without waiting for it to finish.
///
/// The outcome is only observable through the records the execution writes.
#[async_trait]
pub trait ExecutionStarter: Send + Sync {
    async fn start(&self, invocation: PipelineInvocation) -> Result<ExecutionHandle, StartError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("Failed to serialize invocation: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The invocation couldn't be handed over
    #[error("{message}")]
    Dispatch {
        message: String,
        #[source]
        source: Option<Error>,
    },

    #[error("Execution {0} already exists")]
    AlreadyExists(String),
}

/// Starts executions by sending the invocation to the pipeline's input queue.
#[derive(Clone)]
pub struct SqsExecutionStarter {
    sqs: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsExecutionStarter {
    pub fn new(sqs: aws_sdk_sqs::Client, queue_url: impl Into<String>) -> Self {
        Self {
            sqs,
            queue_url: queue_url.into(),
        }
    }

    /// Pull the queue URL from the environment.
    pub fn from_env(sqs: aws_sdk_sqs::Client) -> Result<Self, ConfigError> {
        Ok(Self::new(sqs, required(PIPELINE_INPUT_QUEUE_URL)?))
    }
}

#[async_trait]
impl ExecutionStarter for SqsExecutionStarter {
    async fn start(&self, invocation: PipelineInvocation) -> Result<ExecutionHandle, StartError> {
        let body: String = serde_json::to_string(&invocation)?;

        self.sqs
            .send_message()
            .queue_url(self.queue_url.as_str())
            .message_body(body)
            .send()
            .await
            .map_err(|err| StartError::Dispatch {
                message: err
                    .as_service_error()
                    .and_then(|service_err| service_err.message())
                    .map(str::to_string)
                    .unwrap_or_else(|| err.to_string()),
                source: Some(err.into()),
            })?;

        tracing::debug!(
            execution_name = invocation.execution_name,
            "Sent invocation to pipeline queue"
        );

        Ok(invocation.handle())
    }
}

type RunningExecution = JoinHandle<Result<ExecutionReport, PipelineError>>;

/// Starts executions as tasks on the current runtime.
///
/// Finished executions are kept until waited on or until the next start,
/// which drops every finished one.
pub struct SpawnedExecutions {
    pipeline: Arc<TextPipeline>,
    running: Mutex<HashMap<String, RunningExecution>>,
}

impl SpawnedExecutions {
    pub fn new(pipeline: Arc<TextPipeline>) -> Self {
        Self {
            pipeline,
            running: Mutex::new(HashMap::new()),
        }
    }

    /// Wait for a started execution to finish.
    ///
    /// Returns `None` for unknown names and for executions already waited on.
    pub async fn wait(
        &self,
        execution_name: &str,
    ) -> Option<Result<ExecutionReport, PipelineError>> {
        let execution: RunningExecution = self.running.lock().await.remove(execution_name)?;

        Some(
            execution
                .await
                .unwrap_or_else(|err| Err(PipelineError::Interrupted(err.to_string()))),
        )
    }
}

#[async_trait]
impl ExecutionStarter for SpawnedExecutions {
    async fn start(&self, invocation: PipelineInvocation) -> Result<ExecutionHandle, StartError> {
        let mut running = self.running.lock().await;

        if running.contains_key(&invocation.execution_name) {
            return Err(StartError::AlreadyExists(invocation.execution_name));
        }

        running.retain(|_, execution| !execution.is_finished());

        let handle: ExecutionHandle = invocation.handle();
        let execution_name: String = invocation.execution_name.clone();
        let pipeline: Arc<TextPipeline> = self.pipeline.clone();

        let execution: RunningExecution =
            tokio::spawn(async move { pipeline.run_with_timeout(&invocation).await });

        running.insert(execution_name, execution);

        Ok(handle)
    }
}

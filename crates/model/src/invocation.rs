use crate::{ExecutionHandle, InvocationId, TextSubmission};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The message handed from the gateway to the pipeline to start one execution.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineInvocation {
    pub execution_arn: String,
    pub execution_name: String,
    pub start_date: DateTime<Utc>,
    pub input: TextSubmission,
}

impl PipelineInvocation {
    pub fn new(
        pipeline_arn: &str,
        execution_name: String,
        start_date: DateTime<Utc>,
        input: TextSubmission,
    ) -> Self {
        Self {
            execution_arn: format!("{pipeline_arn}:{execution_name}"),
            execution_name,
            start_date,
            input,
        }
    }

    pub fn handle(&self) -> ExecutionHandle {
        ExecutionHandle {
            execution_arn: self.execution_arn.clone(),
            start_date: self.start_date,
        }
    }
}

impl InvocationId for PipelineInvocation {
    fn invocation_id(&self) -> &str {
        &self.execution_name
    }
}

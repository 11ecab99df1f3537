use crate::config::GatewayConfig;
use crate::request::{execution_name, parse_submission};
use crate::response::{
    FailedResponse, INVALID_BODY_MESSAGE, MessageResponse, StartedResponse, json_response,
};
use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use chrono::{DateTime, Utc};
use http::{Method, StatusCode};
use lambda_runtime::{Error, LambdaEvent, tracing};
use model::invocation::PipelineInvocation;
use model::TextSubmission;
use pipeline::ExecutionStarter;
use std::sync::Arc;

pub mod config;
pub mod request;
pub mod response;

pub const SEND_TEXT_PATH: &str = "/SendText";

/// Front door of the pipeline: validates `POST /SendText` bodies and starts
/// an execution for each accepted one.
///
/// The response only says the execution started; it never waits for it.
pub struct TextGateway {
    starter: Arc<dyn ExecutionStarter>,
    config: GatewayConfig,
}

impl TextGateway {
    pub fn new(starter: Arc<dyn ExecutionStarter>, config: GatewayConfig) -> Self {
        Self { starter, config }
    }

    /// Handler for use with `lambda_runtime::run()` behind an API Gateway
    /// proxy integration.
    pub async fn handle_event(
        &self,
        event: LambdaEvent<ApiGatewayProxyRequest>,
    ) -> Result<ApiGatewayProxyResponse, Error> {
        let (request, context) = event.into_parts();

        let request_id: String = request
            .request_context
            .request_id
            .clone()
            .unwrap_or(context.request_id);

        Ok(self.handle(request_id, &request).await)
    }

    pub async fn handle(
        &self,
        request_id: String,
        request: &ApiGatewayProxyRequest,
    ) -> ApiGatewayProxyResponse {
        let routed: bool = request
            .path
            .as_deref()
            .is_some_and(|path| path.trim_end_matches('/').ends_with(SEND_TEXT_PATH));

        if !routed {
            return json_response(StatusCode::NOT_FOUND, &MessageResponse::new("Not Found"));
        }

        if request.http_method != Method::POST {
            return json_response(
                StatusCode::METHOD_NOT_ALLOWED,
                &MessageResponse::new("Method Not Allowed"),
            );
        }

        let body: Option<&str> = request.body.as_deref();

        let submission: TextSubmission = match parse_submission(body, &self.config.text_field_name)
        {
            Ok(submission) => submission,
            Err(err) => {
                tracing::warn!(request_id, "Rejected request: {err}");

                return json_response(
                    StatusCode::BAD_REQUEST,
                    &MessageResponse::new(INVALID_BODY_MESSAGE),
                );
            }
        };

        let start_date: DateTime<Utc> = Utc::now();
        let invocation: PipelineInvocation = PipelineInvocation::new(
            &self.config.pipeline_arn,
            execution_name(&self.config.pipeline_name, body.unwrap_or_default(), start_date),
            start_date,
            submission,
        );

        tracing::info!(
            request_id,
            execution_name = invocation.execution_name,
            "Starting execution"
        );

        match self.starter.start(invocation).await {
            Ok(handle) => {
                json_response(StatusCode::OK, &StartedResponse::new(request_id, handle))
            }
            Err(err) => {
                tracing::error!(request_id, "Failed to start execution: {err}");

                json_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &FailedResponse {
                        request_id,
                        message: err.to_string().trim().to_string(),
                    },
                )
            }
        }
    }
}

use aws_lambda_events::apigw::ApiGatewayProxyResponse;
use aws_lambda_events::encodings::Body;
use chrono::{DateTime, Utc};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, StatusCode};
use model::ExecutionHandle;
use serde::Serialize;

/// API Gateway's own message for bodies failing the request model.
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StartedResponse {
    pub request_id: String,
    pub execution_arn: String,
    pub start_date: DateTime<Utc>,
}

impl StartedResponse {
    pub fn new(request_id: String, handle: ExecutionHandle) -> Self {
        Self {
            request_id,
            execution_arn: handle.execution_arn,
            start_date: handle.start_date,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FailedResponse {
    pub request_id: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub(crate) fn json_response(status: StatusCode, body: &impl Serialize) -> ApiGatewayProxyResponse {
    let mut headers: HeaderMap = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    ApiGatewayProxyResponse {
        status_code: i64::from(status.as_u16()),
        headers,
        body: serde_json::to_string(body).ok().map(Body::Text),
        ..Default::default()
    }
}

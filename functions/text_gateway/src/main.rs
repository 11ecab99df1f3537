use aws_config::{BehaviorVersion, SdkConfig};
use aws_lambda_events::apigw::ApiGatewayProxyRequest;
use gateway::TextGateway;
use gateway::config::GatewayConfig;
use lambda_runtime::{Error, LambdaEvent, service_fn, tracing};
use pipeline::SqsExecutionStarter;
use std::sync::Arc;

/// Serves `POST /SendText` behind an API Gateway proxy integration.
#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let aws_config: SdkConfig = aws_config::load_defaults(BehaviorVersion::latest()).await;

    let starter: SqsExecutionStarter =
        SqsExecutionStarter::from_env(aws_sdk_sqs::Client::new(&aws_config))?;
    let gateway: TextGateway = TextGateway::new(Arc::new(starter), GatewayConfig::from_env());
    let gateway: &TextGateway = &gateway;

    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<ApiGatewayProxyRequest>| async move {
            gateway.handle_event(event).await
        },
    ))
    .await
}

mod config;
mod dispatcher;
mod ec2_instance_client;
mod error;
mod instance;
mod request;
mod response;

use anyhow::Context;
use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use rusoto_core::Region;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::ec2_instance_client::Ec2InstanceClient;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .without_time()
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    info!(?config, "loaded configuration");

    let config = &config;
    run(service_fn(
        move |event: LambdaEvent<ApiGatewayProxyRequest>| async move {
            instance_handler(event, config).await
        },
    ))
    .await
}

async fn instance_handler(
    event: LambdaEvent<ApiGatewayProxyRequest>,
    config: &Config,
) -> Result<ApiGatewayProxyResponse, Error> {
    let request = event.payload;
    info!(
        request_id = %event.context.request_id,
        method = %request.http_method,
        path = ?request.path,
        "received request"
    );

    let client = Ec2InstanceClient::new(Region::default());
    Ok(Dispatcher::new(&client, config).handle(&request).await)
}

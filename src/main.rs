use aws_config::{BehaviorVersion, SdkConfig};
use lambda_runtime::{service_fn, tracing};
use model::Error;
use relay::config::RelayConfig;
use relay::relay_fn;
use relay::runtime::StatusRelay;
use service_codepipeline::CodePipelineReporter;
use service_sfn::StepFunctionsLister;
use std::sync::Arc;

/// Wire the relay to the AWS services it talks to.
fn status_relay(
    sfn: aws_sdk_sfn::Client,
    codepipeline: aws_sdk_codepipeline::Client,
    config: RelayConfig,
) -> StatusRelay {
    StatusRelay::new(
        Arc::new(StepFunctionsLister::new(sfn)),
        Arc::new(CodePipelineReporter::new(codepipeline)),
        config,
    )
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config: RelayConfig = RelayConfig::from_env()?;
    tracing::info!(fault_policy = ?config.fault_policy, "Loading function");

    let sdk_config: SdkConfig = aws_config::load_defaults(BehaviorVersion::latest()).await;

    let relay: StatusRelay = status_relay(
        aws_sdk_sfn::Client::new(&sdk_config),
        aws_sdk_codepipeline::Client::new(&sdk_config),
        config,
    );

    lambda_runtime::run(service_fn(relay_fn(&relay))).await
}

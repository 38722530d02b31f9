use crate::runtime::{RelayResponse, StatusRelay};
use lambda_runtime::LambdaEvent;
use model::{Error, PipelineJobEvent};
use std::future::Future;
use std::pin::Pin;

pub mod config;
pub mod error;
pub mod params;
pub mod runtime;
pub mod status;

/// Creates a handler function for the relay designed for use with `lambda_runtime::run()`
///
/// Expects the function to be the target of a CodePipeline `Invoke` action.
/// Exactly one job result is reported per event, unless the event is too
/// malformed to name a job.
///
/// ```ignore
/// use lambda_runtime::service_fn;
/// use relay::config::RelayConfig;
/// use relay::runtime::StatusRelay;
/// use relay::relay_fn;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Error> {
///     let relay: StatusRelay = StatusRelay::new(lister, reporter, RelayConfig::from_env()?);
///
///     lambda_runtime::run(service_fn(relay_fn(&relay))).await
/// }
/// ```
pub fn relay_fn<'a>(
    relay: &'a StatusRelay,
) -> impl Fn(RelayLambdaEvent) -> Pin<Box<dyn Future<Output = Result<RelayResponse, Error>> + 'a>>
{
    move |event: RelayLambdaEvent| Box::pin(relay.accept(event))
}

pub type RelayLambdaEvent = LambdaEvent<PipelineJobEvent>;

use model::Error;
use thiserror::Error;

/// Faults raised while handling a single pipeline job.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invocation is malformed: missing {0}")]
    MalformedInvocation(&'static str),

    #[error("job data has no UserParameters")]
    MissingUserParameters,

    #[error("UserParameters could not be decoded as a JSON object: {0}")]
    ParameterDecodeError(#[source] serde_json::Error),

    #[error("UserParameters JSON must include the stateMachineArn")]
    MissingStateMachineArn,

    #[error("failed to list running executions: {0}")]
    OrchestrationQueryFault(#[source] Error),

    #[error("failed to report job result to the pipeline: {0}")]
    ReportCallbackFault(#[source] Error),
}

impl RelayError {
    /// Whether the fault happened before anything was reported to the pipeline.
    /// Only those are handled at the fault boundary, the rest propagate.
    pub fn is_pre_report(&self) -> bool {
        !matches!(self, RelayError::ReportCallbackFault(_))
    }
}

use async_trait::async_trait;
use model::{ContinuationToken, Error};

/// The cap placed on every running-execution query.
/// One result is enough to tell "something is running" from "nothing is".
pub const RUNNING_EXECUTIONS_CAP: i32 = 1;

/// A query for the running executions of a single state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionStatusQuery {
    pub state_machine_arn: String,
    pub max_results: i32,
}

impl ExecutionStatusQuery {
    /// Running executions of the state machine, capped at [`RUNNING_EXECUTIONS_CAP`].
    pub fn running(state_machine_arn: impl Into<String>) -> Self {
        ExecutionStatusQuery {
            state_machine_arn: state_machine_arn.into(),
            max_results: RUNNING_EXECUTIONS_CAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningExecution {
    pub execution_arn: String,
    pub name: String,
}

/// Lists the running executions of a state machine.
/// Most common is the Step Functions implementation.
#[async_trait]
pub trait ExecutionLister: Send + Sync {
    fn name(&self) -> &'static str;

    async fn list_executions(
        &self,
        query: &ExecutionStatusQuery,
    ) -> Result<Vec<RunningExecution>, Error>;
}

/// Receives the job callbacks of the pipeline which invoked us.
/// Exactly one of these is expected per job.
#[async_trait]
pub trait PipelineReporter: Send + Sync {
    async fn put_job_success(&self, job_id: &str, message: &str) -> Result<(), Error>;

    async fn put_job_failure(&self, job_id: &str, message: &str) -> Result<(), Error>;

    /// Succeed the job with a continuation token.
    /// The pipeline will invoke us again with the token in the job data.
    async fn continue_job_later(
        &self,
        job_id: &str,
        message: &str,
        token: &ContinuationToken,
    ) -> Result<(), Error>;
}

/// CodePipeline rejects execution summaries above this length.
pub const MAX_SUMMARY_LENGTH: usize = 2048;
/// CodePipeline rejects failure messages above this length.
pub const MAX_FAILURE_MESSAGE_LENGTH: usize = 5000;

/// Truncate a message to at most `limit` bytes without splitting a character.
pub fn truncate_message(message: &str, limit: usize) -> &str {
    if message.len() <= limit {
        return message;
    }

    let mut end: usize = limit;
    while !message.is_char_boundary(end) {
        end -= 1;
    }

    &message[..end]
}

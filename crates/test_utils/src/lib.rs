use async_trait::async_trait;
use aws_sdk_sfn::operation::list_executions::ListExecutionsOutput;
use aws_sdk_sfn::primitives::DateTime;
use aws_sdk_sfn::types::{ExecutionListItem, ExecutionStatus};
use aws_smithy_mocks::{Rule, mock, mock_client};
use model::{
    ActionConfiguration, ContinuationToken, Error, JobConfiguration, JobData, PipelineJob,
    PipelineJobEvent,
};
use service::{ExecutionLister, ExecutionStatusQuery, PipelineReporter, RunningExecution};
use std::sync::{Arc, Mutex};

/// Test values
pub const TEST_JOB_ID: &str = "job-42";
pub const TEST_STATE_MACHINE_ARN: &str =
    "arn:aws:states:eu-west-1:111111111111:stateMachine:X";

/// User parameters naming the test state machine
pub fn test_user_parameters() -> String {
    serde_json::json!({ "stateMachineArn": TEST_STATE_MACHINE_ARN }).to_string()
}

/// Create a CodePipeline job event with the given job id and raw user parameters
pub fn pipeline_job_event(
    job_id: &str,
    user_parameters: &str,
    continuation_token: Option<&str>,
) -> PipelineJobEvent {
    PipelineJobEvent {
        job: Some(PipelineJob {
            id: Some(job_id.to_string()),
            account_id: Some("111111111111".to_string()),
            data: Some(JobData {
                action_configuration: Some(ActionConfiguration {
                    configuration: Some(JobConfiguration {
                        function_name: Some("StatusRelay".to_string()),
                        user_parameters: Some(user_parameters.to_string()),
                    }),
                }),
                continuation_token: continuation_token.map(str::to_string),
            }),
        }),
    }
}

/// A callback received by a [`RecordingReporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    Success {
        job_id: String,
        message: String,
    },
    Failure {
        job_id: String,
        message: String,
    },
    Continuation {
        job_id: String,
        message: String,
        token: String,
    },
}

/// Reporter which keeps every callback in memory.
/// Continuation tokens are stored encoded, as CodePipeline would receive them.
#[derive(Default, Clone)]
pub struct RecordingReporter {
    callbacks: Arc<Mutex<Vec<Callback>>>,
}

impl RecordingReporter {
    pub fn callbacks(&self) -> Vec<Callback> {
        self.callbacks.lock().unwrap().clone()
    }

    fn record(&self, callback: Callback) {
        self.callbacks.lock().unwrap().push(callback);
    }
}

#[async_trait]
impl PipelineReporter for RecordingReporter {
    async fn put_job_success(&self, job_id: &str, message: &str) -> Result<(), Error> {
        self.record(Callback::Success {
            job_id: job_id.to_string(),
            message: message.to_string(),
        });

        Ok(())
    }

    async fn put_job_failure(&self, job_id: &str, message: &str) -> Result<(), Error> {
        self.record(Callback::Failure {
            job_id: job_id.to_string(),
            message: message.to_string(),
        });

        Ok(())
    }

    async fn continue_job_later(
        &self,
        job_id: &str,
        message: &str,
        token: &ContinuationToken,
    ) -> Result<(), Error> {
        self.record(Callback::Continuation {
            job_id: job_id.to_string(),
            message: message.to_string(),
            token: token.encode()?,
        });

        Ok(())
    }
}

/// Reporter whose every callback fails, as if CodePipeline was unreachable.
pub struct FailingReporter;

#[async_trait]
impl PipelineReporter for FailingReporter {
    async fn put_job_success(&self, _: &str, _: &str) -> Result<(), Error> {
        Err("pipeline unavailable".into())
    }

    async fn put_job_failure(&self, _: &str, _: &str) -> Result<(), Error> {
        Err("pipeline unavailable".into())
    }

    async fn continue_job_later(&self, _: &str, _: &str, _: &ContinuationToken) -> Result<(), Error> {
        Err("pipeline unavailable".into())
    }
}

/// Lister returning a fixed number of running executions, whatever the cap.
/// Every query it receives is kept.
#[derive(Clone)]
pub struct FixedExecutionLister {
    running: usize,
    queries: Arc<Mutex<Vec<ExecutionStatusQuery>>>,
}

impl FixedExecutionLister {
    pub fn new(running: usize) -> Self {
        Self {
            running,
            queries: Default::default(),
        }
    }

    pub fn queries(&self) -> Vec<ExecutionStatusQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionLister for FixedExecutionLister {
    fn name(&self) -> &'static str {
        "FixedExecutionLister"
    }

    async fn list_executions(
        &self,
        query: &ExecutionStatusQuery,
    ) -> Result<Vec<RunningExecution>, Error> {
        self.queries.lock().unwrap().push(query.clone());

        Ok((0..self.running)
            .map(|i| RunningExecution {
                execution_arn: format!("{}:execution-{i}", query.state_machine_arn),
                name: format!("execution-{i}"),
            })
            .collect())
    }
}

/// Lister which always fails, as if Step Functions rejected the request.
pub struct FailingExecutionLister;

#[async_trait]
impl ExecutionLister for FailingExecutionLister {
    fn name(&self) -> &'static str {
        "FailingExecutionLister"
    }

    async fn list_executions(&self, _: &ExecutionStatusQuery) -> Result<Vec<RunningExecution>, Error> {
        Err("access denied".into())
    }
}

/// A `ListExecutions` response holding `running` executions of the test state machine
pub fn list_executions_output(running: usize) -> ListExecutionsOutput {
    let executions: Vec<ExecutionListItem> = (0..running)
        .map(|i| {
            ExecutionListItem::builder()
                .execution_arn(format!("{TEST_STATE_MACHINE_ARN}:execution-{i}"))
                .state_machine_arn(TEST_STATE_MACHINE_ARN)
                .name(format!("execution-{i}"))
                .status(ExecutionStatus::Running)
                .start_date(DateTime::from_secs(0))
                .build()
                .expect("Execution item should build")
        })
        .collect();

    ListExecutionsOutput::builder()
        .set_executions(Some(executions))
        .build()
        .expect("List executions output should build")
}

/// A mock Step Functions client reporting `running` executions for every query
pub fn create_mock_sfn_client(running: usize) -> aws_sdk_sfn::Client {
    let list_rule: Rule = mock!(aws_sdk_sfn::Client::list_executions)
        .match_requests(|_| true)
        .sequence()
        .output(move || list_executions_output(running))
        .repeatedly()
        .build();

    mock_client!(aws_sdk_sfn, [&list_rule])
}

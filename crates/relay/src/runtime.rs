use crate::config::{FaultPolicy, RelayConfig};
use crate::error::RelayError;
use crate::params::get_user_params;
use crate::status::classify;
use lambda_runtime::tracing::{Instrument, Span};
use lambda_runtime::{LambdaEvent, tracing};
use model::{ContinuationToken, Error, JobData, Outcome, OutcomeKind, PipelineJobEvent, UserParameters};
use serde::Serialize;
use service::{ExecutionLister, ExecutionStatusQuery, PipelineReporter, RunningExecution};
use std::sync::Arc;

/// Informational result of an invocation.
/// `outcome` is `None` when nothing was reported to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResponse {
    pub job_id: Option<String>,
    pub outcome: Option<OutcomeKind>,
}

/// Relays the running state of a Step Functions state machine to the
/// CodePipeline job which invoked us.
pub struct StatusRelay {
    lister: Arc<dyn ExecutionLister>,
    reporter: Arc<dyn PipelineReporter>,
    config: RelayConfig,
}

impl StatusRelay {
    pub fn new(
        lister: Arc<dyn ExecutionLister>,
        reporter: Arc<dyn PipelineReporter>,
        config: RelayConfig,
    ) -> StatusRelay {
        StatusRelay {
            lister,
            reporter,
            config,
        }
    }

    /// Handle a Lambda event within a span for the request.
    pub async fn accept(&self, event: LambdaEvent<PipelineJobEvent>) -> Result<RelayResponse, Error> {
        let request_id: &str = event.context.request_id.as_str();
        let relay_span: Span = tracing::span!(tracing::Level::INFO, "Status relay", request_id);

        self.handle(event.payload).instrument(relay_span).await
    }

    /// Report exactly one outcome for the job.
    ///
    /// Faults before the report are dealt with according to the fault policy
    /// and never fail the invocation. A fault while reporting is returned.
    pub async fn handle(&self, event: PipelineJobEvent) -> Result<RelayResponse, Error> {
        let job_id: Option<String> = event.job_id().map(str::to_string);

        let result: Result<OutcomeKind, RelayError> = match self.evaluate(&event).await {
            Ok((job_id, outcome)) => self.report(job_id, &outcome).await.map(|()| outcome.kind()),
            Err(err) => Err(err),
        };

        match result {
            Ok(kind) => Ok(RelayResponse {
                job_id,
                outcome: Some(kind),
            }),
            Err(err) if err.is_pre_report() => self.on_fault(job_id, err).await,
            Err(err) => Err(err.into()),
        }
    }

    async fn evaluate<'a>(
        &self,
        event: &'a PipelineJobEvent,
    ) -> Result<(&'a str, Outcome), RelayError> {
        let job = event
            .job
            .as_ref()
            .ok_or(RelayError::MalformedInvocation("CodePipeline.job"))?;
        let job_id: &str = job
            .id
            .as_deref()
            .ok_or(RelayError::MalformedInvocation("job id"))?;
        let job_data: &JobData = job
            .data
            .as_ref()
            .ok_or(RelayError::MalformedInvocation("job data"))?;

        let params: UserParameters = get_user_params(job_data)?;
        let state_machine_arn: &str = params.state_machine_arn.as_str();

        tracing::info!(job_id, state_machine_arn, "Checking state machine status");

        // Polling again or checking for the first time, the check is the same
        match job_data.continuation_token.as_deref() {
            Some(token) => match ContinuationToken::decode(token) {
                Ok(token) => tracing::debug!(
                    previous_job_id = %token.previous_job_id,
                    "Continuing previous job"
                ),
                Err(err) => tracing::warn!("Ignoring undecodable continuation token: {err}"),
            },
            None => tracing::debug!("First check for job"),
        }

        let running_executions: usize = self.check_stepfunction_status(state_machine_arn).await?;

        Ok((job_id, classify(job_id, running_executions)))
    }

    async fn check_stepfunction_status(&self, state_machine_arn: &str) -> Result<usize, RelayError> {
        let query: ExecutionStatusQuery = ExecutionStatusQuery::running(state_machine_arn);

        let executions: Vec<RunningExecution> = self
            .lister
            .list_executions(&query)
            .await
            .map_err(RelayError::OrchestrationQueryFault)?;

        tracing::info!(
            lister = self.lister.name(),
            "Number of executions running: {}",
            executions.len()
        );

        for execution in &executions {
            tracing::debug!(
                execution_arn = %execution.execution_arn,
                name = %execution.name,
                "Running execution"
            );
        }

        Ok(executions.len())
    }

    async fn report(&self, job_id: &str, outcome: &Outcome) -> Result<(), RelayError> {
        let result: Result<(), Error> = match outcome {
            Outcome::Success { message } => self.reporter.put_job_success(job_id, message).await,
            Outcome::Failure { message } => self.reporter.put_job_failure(job_id, message).await,
            Outcome::Continuation { message, token } => {
                self.reporter
                    .continue_job_later(job_id, message, token)
                    .await
            }
        };

        result.map_err(RelayError::ReportCallbackFault)
    }

    async fn on_fault(&self, job_id: Option<String>, err: RelayError) -> Result<RelayResponse, Error> {
        tracing::error!("Function failed due to exception: {err}");

        match (self.config.fault_policy, job_id) {
            (FaultPolicy::Report, Some(job_id)) => {
                self.reporter
                    .put_job_failure(&job_id, &err.to_string())
                    .await
                    .map_err(RelayError::ReportCallbackFault)?;

                Ok(RelayResponse {
                    job_id: Some(job_id),
                    outcome: Some(OutcomeKind::Failure),
                })
            }
            (FaultPolicy::Report, None) => {
                tracing::warn!("No job id to report the failure against");

                Ok(RelayResponse {
                    job_id: None,
                    outcome: None,
                })
            }
            (FaultPolicy::Log, job_id) => Ok(RelayResponse {
                job_id,
                outcome: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_runtime::Context;
    use test_utils::{
        Callback, FailingExecutionLister, FailingReporter, FixedExecutionLister,
        RecordingReporter, TEST_JOB_ID, TEST_STATE_MACHINE_ARN, pipeline_job_event,
        test_user_parameters,
    };

    fn relay(
        lister: impl ExecutionLister + 'static,
        reporter: &RecordingReporter,
        fault_policy: FaultPolicy,
    ) -> StatusRelay {
        StatusRelay::new(
            Arc::new(lister),
            Arc::new(reporter.clone()),
            RelayConfig { fault_policy },
        )
    }

    #[tokio::test]
    async fn nothing_running_reports_success() {
        let reporter: RecordingReporter = RecordingReporter::default();
        let relay: StatusRelay = relay(FixedExecutionLister::new(0), &reporter, FaultPolicy::Report);

        let response: RelayResponse = relay
            .handle(pipeline_job_event(TEST_JOB_ID, &test_user_parameters(), None))
            .await
            .expect("Handling should succeed");

        assert_eq!(Some(OutcomeKind::Success), response.outcome);
        assert_eq!(Some(TEST_JOB_ID.to_string()), response.job_id);
        assert_eq!(
            vec![Callback::Success {
                job_id: "job-42".to_string(),
                message: "execution complete".to_string(),
            }],
            reporter.callbacks()
        );
    }

    #[tokio::test]
    async fn one_running_reports_continuation() {
        let reporter: RecordingReporter = RecordingReporter::default();
        let relay: StatusRelay = relay(FixedExecutionLister::new(1), &reporter, FaultPolicy::Report);

        relay
            .handle(pipeline_job_event(TEST_JOB_ID, &test_user_parameters(), None))
            .await
            .expect("Handling should succeed");

        let callbacks: Vec<Callback> = reporter.callbacks();
        assert_eq!(1, callbacks.len());

        let Callback::Continuation { job_id, token, .. } = &callbacks[0] else {
            panic!("Expected a continuation, got {:?}", callbacks[0]);
        };
        assert_eq!("job-42", job_id);

        let decoded: serde_json::Value = serde_json::from_str(token).unwrap();
        assert_eq!(serde_json::json!({ "previousJobId": "job-42" }), decoded);
    }

    #[tokio::test]
    async fn several_running_reports_failure_with_count() {
        let reporter: RecordingReporter = RecordingReporter::default();
        let relay: StatusRelay = relay(FixedExecutionLister::new(2), &reporter, FaultPolicy::Report);

        let response: RelayResponse = relay
            .handle(pipeline_job_event(TEST_JOB_ID, &test_user_parameters(), None))
            .await
            .expect("Handling should succeed");

        assert_eq!(Some(OutcomeKind::Failure), response.outcome);

        let callbacks: Vec<Callback> = reporter.callbacks();
        assert_eq!(1, callbacks.len());
        assert!(matches!(
            &callbacks[0],
            Callback::Failure { job_id, message } if job_id == "job-42" && message.contains('2')
        ));
    }

    #[tokio::test]
    async fn queries_running_executions_of_the_state_machine() {
        let lister: FixedExecutionLister = FixedExecutionLister::new(0);
        let relay: StatusRelay = relay(lister.clone(), &RecordingReporter::default(), FaultPolicy::Report);

        relay
            .handle(pipeline_job_event(TEST_JOB_ID, &test_user_parameters(), None))
            .await
            .expect("Handling should succeed");

        assert_eq!(
            vec![ExecutionStatusQuery::running(TEST_STATE_MACHINE_ARN)],
            lister.queries()
        );
    }

    #[tokio::test]
    async fn continuation_token_does_not_change_the_check() {
        for token in [None, Some(r#"{"previousJobId":"job-41"}"#), Some("opaque")] {
            let lister: FixedExecutionLister = FixedExecutionLister::new(1);
            let reporter: RecordingReporter = RecordingReporter::default();
            let relay: StatusRelay = relay(lister.clone(), &reporter, FaultPolicy::Report);

            let response: RelayResponse = relay
                .handle(pipeline_job_event(TEST_JOB_ID, &test_user_parameters(), token))
                .await
                .expect("Handling should succeed");

            assert_eq!(Some(OutcomeKind::Continuation), response.outcome);
            assert_eq!(1, lister.queries().len());
            assert_eq!(1, reporter.callbacks().len());
        }
    }

    #[tokio::test]
    async fn invalid_parameters_are_only_logged_under_log_policy() {
        for parameters in ["{not json", r#"{"other": "value"}"#] {
            let lister: FixedExecutionLister = FixedExecutionLister::new(0);
            let reporter: RecordingReporter = RecordingReporter::default();
            let relay: StatusRelay = relay(lister.clone(), &reporter, FaultPolicy::Log);

            let response: RelayResponse = relay
                .handle(pipeline_job_event(TEST_JOB_ID, parameters, None))
                .await
                .expect("Faults should not fail the invocation");

            assert_eq!(None, response.outcome);
            assert!(reporter.callbacks().is_empty());
            // No query is made before the parameters are valid
            assert!(lister.queries().is_empty());
        }
    }

    #[tokio::test]
    async fn invalid_parameters_are_reported_under_report_policy() {
        let reporter: RecordingReporter = RecordingReporter::default();
        let relay: StatusRelay = relay(FixedExecutionLister::new(0), &reporter, FaultPolicy::Report);

        let response: RelayResponse = relay
            .handle(pipeline_job_event(TEST_JOB_ID, r#"{"other": "value"}"#, None))
            .await
            .expect("Faults should not fail the invocation");

        assert_eq!(Some(OutcomeKind::Failure), response.outcome);
        assert_eq!(
            vec![Callback::Failure {
                job_id: "job-42".to_string(),
                message: "UserParameters JSON must include the stateMachineArn".to_string(),
            }],
            reporter.callbacks()
        );
    }

    #[tokio::test]
    async fn missing_job_id_is_never_reported() {
        for fault_policy in [FaultPolicy::Report, FaultPolicy::Log] {
            let reporter: RecordingReporter = RecordingReporter::default();
            let relay: StatusRelay = relay(FixedExecutionLister::new(0), &reporter, fault_policy);

            let mut event: PipelineJobEvent =
                pipeline_job_event(TEST_JOB_ID, &test_user_parameters(), None);
            if let Some(job) = event.job.as_mut() {
                job.id = None;
            }

            let response: RelayResponse = relay
                .handle(event)
                .await
                .expect("Faults should not fail the invocation");

            assert_eq!(None, response.job_id);
            assert_eq!(None, response.outcome);
            assert!(reporter.callbacks().is_empty());
        }
    }

    #[tokio::test]
    async fn missing_job_data_is_reported_against_the_job() {
        let reporter: RecordingReporter = RecordingReporter::default();
        let relay: StatusRelay = relay(FixedExecutionLister::new(0), &reporter, FaultPolicy::Report);

        let mut event: PipelineJobEvent = pipeline_job_event(TEST_JOB_ID, "{}", None);
        if let Some(job) = event.job.as_mut() {
            job.data = None;
        }

        relay.handle(event).await.expect("Faults should not fail the invocation");

        assert!(matches!(
            reporter.callbacks().as_slice(),
            [Callback::Failure { job_id, message }] if job_id == "job-42" && message.contains("job data")
        ));
    }

    #[tokio::test]
    async fn orchestration_fault_follows_policy() {
        let reporter: RecordingReporter = RecordingReporter::default();
        let relay_log: StatusRelay = relay(FailingExecutionLister, &reporter, FaultPolicy::Log);

        let response: RelayResponse = relay_log
            .handle(pipeline_job_event(TEST_JOB_ID, &test_user_parameters(), None))
            .await
            .expect("Faults should not fail the invocation");

        assert_eq!(None, response.outcome);
        assert!(reporter.callbacks().is_empty());

        let relay_report: StatusRelay = relay(FailingExecutionLister, &reporter, FaultPolicy::Report);

        let response: RelayResponse = relay_report
            .handle(pipeline_job_event(TEST_JOB_ID, &test_user_parameters(), None))
            .await
            .expect("Faults should not fail the invocation");

        assert_eq!(Some(OutcomeKind::Failure), response.outcome);
        assert!(matches!(
            reporter.callbacks().as_slice(),
            [Callback::Failure { message, .. }] if message.contains("access denied")
        ));
    }

    #[tokio::test]
    async fn report_fault_fails_the_invocation() {
        let relay: StatusRelay = StatusRelay::new(
            Arc::new(FixedExecutionLister::new(0)),
            Arc::new(FailingReporter),
            RelayConfig::default(),
        );

        let result: Result<RelayResponse, Error> = relay
            .handle(pipeline_job_event(TEST_JOB_ID, &test_user_parameters(), None))
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn failed_failure_report_fails_the_invocation() {
        let relay: StatusRelay = StatusRelay::new(
            Arc::new(FailingExecutionLister),
            Arc::new(FailingReporter),
            RelayConfig::default(),
        );

        let result: Result<RelayResponse, Error> = relay
            .handle(pipeline_job_event(TEST_JOB_ID, &test_user_parameters(), None))
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn accepts_lambda_event() {
        let reporter: RecordingReporter = RecordingReporter::default();
        let relay: StatusRelay = relay(FixedExecutionLister::new(0), &reporter, FaultPolicy::Report);

        let event: LambdaEvent<PipelineJobEvent> = LambdaEvent::new(
            pipeline_job_event(TEST_JOB_ID, &test_user_parameters(), None),
            Context::default(),
        );

        let response: RelayResponse = relay.accept(event).await.expect("Handling should succeed");

        assert_eq!(Some(OutcomeKind::Success), response.outcome);
    }
}

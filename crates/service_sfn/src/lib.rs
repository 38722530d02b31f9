use async_trait::async_trait;
use aws_sdk_sfn::operation::list_executions::ListExecutionsOutput;
use aws_sdk_sfn::types::{ExecutionListItem, ExecutionStatus};
use lambda_runtime::tracing;
use model::Error;
use service::{ExecutionLister, ExecutionStatusQuery, RunningExecution};

/// Lists running executions using the Step Functions `ListExecutions` API.
pub struct StepFunctionsLister {
    pub sfn: aws_sdk_sfn::Client,
}

impl StepFunctionsLister {
    pub fn new(sfn: aws_sdk_sfn::Client) -> Self {
        Self { sfn }
    }
}

#[async_trait]
impl ExecutionLister for StepFunctionsLister {
    fn name(&self) -> &'static str {
        "StepFunctions"
    }

    async fn list_executions(
        &self,
        query: &ExecutionStatusQuery,
    ) -> Result<Vec<RunningExecution>, Error> {
        let output: ListExecutionsOutput = self
            .sfn
            .list_executions()
            .state_machine_arn(query.state_machine_arn.as_str())
            .status_filter(ExecutionStatus::Running)
            .max_results(query.max_results)
            .send()
            .await?;

        // More pages may exist, but only the first page is ever counted
        if output.next_token().is_some() {
            tracing::debug!("Ignoring further pages of executions");
        }

        Ok(output
            .executions()
            .iter()
            .map(|item: &ExecutionListItem| RunningExecution {
                execution_arn: item.execution_arn().to_string(),
                name: item.name().to_string(),
            })
            .collect())
    }
}

use async_trait::async_trait;
use aws_sdk_codepipeline::types::{ExecutionDetails, FailureDetails, FailureType};
use lambda_runtime::tracing;
use model::{ContinuationToken, Error};
use service::{
    MAX_FAILURE_MESSAGE_LENGTH, MAX_SUMMARY_LENGTH, PipelineReporter, truncate_message,
};

/// Reports job results back to CodePipeline.
pub struct CodePipelineReporter {
    pub codepipeline: aws_sdk_codepipeline::Client,
}

impl CodePipelineReporter {
    pub fn new(codepipeline: aws_sdk_codepipeline::Client) -> Self {
        Self { codepipeline }
    }
}

fn execution_details(message: &str) -> ExecutionDetails {
    ExecutionDetails::builder()
        .summary(truncate_message(message, MAX_SUMMARY_LENGTH))
        .build()
}

#[async_trait]
impl PipelineReporter for CodePipelineReporter {
    async fn put_job_success(&self, job_id: &str, message: &str) -> Result<(), Error> {
        tracing::info!(job_id, message, "Putting job success");

        self.codepipeline
            .put_job_success_result()
            .job_id(job_id)
            .execution_details(execution_details(message))
            .send()
            .await?;

        Ok(())
    }

    async fn put_job_failure(&self, job_id: &str, message: &str) -> Result<(), Error> {
        tracing::info!(job_id, message, "Putting job failure");

        let failure_details: FailureDetails = FailureDetails::builder()
            .r#type(FailureType::JobFailed)
            .message(truncate_message(message, MAX_FAILURE_MESSAGE_LENGTH))
            .build()?;

        self.codepipeline
            .put_job_failure_result()
            .job_id(job_id)
            .failure_details(failure_details)
            .send()
            .await?;

        Ok(())
    }

    async fn continue_job_later(
        &self,
        job_id: &str,
        message: &str,
        token: &ContinuationToken,
    ) -> Result<(), Error> {
        tracing::info!(job_id, message, "Putting job continuation");

        self.codepipeline
            .put_job_success_result()
            .job_id(job_id)
            .continuation_token(token.encode()?)
            .execution_details(execution_details(message))
            .send()
            .await?;

        Ok(())
    }
}

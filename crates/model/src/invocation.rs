use serde::{Deserialize, Serialize};

/// The event CodePipeline sends to an `Invoke` action.
///
/// Every level is optional so a payload missing expected fields still reaches
/// the handler, which decides how to treat it.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PipelineJobEvent {
    #[serde(rename = "CodePipeline.job", default)]
    pub job: Option<PipelineJob>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineJob {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub data: Option<JobData>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobData {
    #[serde(default)]
    pub action_configuration: Option<ActionConfiguration>,
    // Only present when the pipeline re-invokes a job we continued
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ActionConfiguration {
    #[serde(default)]
    pub configuration: Option<JobConfiguration>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct JobConfiguration {
    #[serde(rename = "FunctionName", default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(rename = "UserParameters", alias = "userParameters", default)]
    pub user_parameters: Option<String>,
}

impl PipelineJobEvent {
    pub fn job_id(&self) -> Option<&str> {
        self.job.as_ref()?.id.as_deref()
    }
}

impl JobData {
    /// The raw `UserParameters` string configured on the pipeline action.
    pub fn user_parameters(&self) -> Option<&str> {
        self.action_configuration
            .as_ref()?
            .configuration
            .as_ref()?
            .user_parameters
            .as_deref()
    }
}

/// Key of the state machine ARN in the user parameters.
pub const STATE_MACHINE_ARN_KEY: &str = "stateMachineArn";
/// Key used by pipelines configured for the first version of the function.
pub const LEGACY_STATE_MACHINE_ARN_KEY: &str = "stateMachineARN";

/// Decoded `UserParameters` of the pipeline action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserParameters {
    pub state_machine_arn: String,
}

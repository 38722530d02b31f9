use crate::error::RelayError;
use model::params::{LEGACY_STATE_MACHINE_ARN_KEY, STATE_MACHINE_ARN_KEY};
use model::{JobData, UserParameters};
use serde_json::{Map, Value};

/// Decode the JSON user parameters and validate the required properties.
///
/// The parameters are configured on the pipeline action as a JSON string so
/// multiple values can be passed. They must decode to an object holding a
/// non-empty `stateMachineArn`.
pub fn get_user_params(job_data: &JobData) -> Result<UserParameters, RelayError> {
    let user_parameters: &str = job_data
        .user_parameters()
        .ok_or(RelayError::MissingUserParameters)?;

    let mut object: Map<String, Value> =
        serde_json::from_str(user_parameters).map_err(RelayError::ParameterDecodeError)?;

    // The current key wins when both are present
    let value: Value = object
        .remove(STATE_MACHINE_ARN_KEY)
        .filter(|value| !value.is_null())
        .or_else(|| object.remove(LEGACY_STATE_MACHINE_ARN_KEY))
        .filter(|value| !value.is_null())
        .ok_or(RelayError::MissingStateMachineArn)?;

    let state_machine_arn: String =
        serde_json::from_value(value).map_err(RelayError::ParameterDecodeError)?;

    if state_machine_arn.trim().is_empty() {
        return Err(RelayError::MissingStateMachineArn);
    }

    Ok(UserParameters { state_machine_arn })
}

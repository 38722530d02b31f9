use model::outcome::{MESSAGE_COMPLETE, MESSAGE_IN_PROGRESS};
use model::{ContinuationToken, Outcome};

/// Decide the job outcome from the number of running executions.
///
/// The query is capped at one result, so more than one is not expected.
/// It is still reported as a failure rather than trusted to never happen.
pub fn classify(job_id: &str, running_executions: usize) -> Outcome {
    match running_executions {
        0 => Outcome::Success {
            message: MESSAGE_COMPLETE.to_string(),
        },
        1 => Outcome::Continuation {
            message: MESSAGE_IN_PROGRESS.to_string(),
            token: ContinuationToken::new(job_id),
        },
        n => Outcome::Failure {
            message: format!("update failed, number of running executions is > 1: {n}"),
        },
    }
}

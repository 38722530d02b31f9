use serde::{Deserialize, Serialize};

pub const MESSAGE_IN_PROGRESS: &str = "execution still in progress";
pub const MESSAGE_COMPLETE: &str = "execution complete";

/// Handed back to CodePipeline with a continuation and replayed verbatim on
/// the next invocation of the same stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationToken {
    #[serde(rename = "previousJobId", alias = "previous_job_id")]
    pub previous_job_id: String,
}

impl ContinuationToken {
    pub fn new(previous_job_id: impl Into<String>) -> Self {
        ContinuationToken {
            previous_job_id: previous_job_id.into(),
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(token: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(token)
    }
}

/// The single result reported to the pipeline for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { message: String },
    Failure { message: String },
    Continuation {
        message: String,
        token: ContinuationToken,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Success,
    Failure,
    Continuation,
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Success { .. } => OutcomeKind::Success,
            Outcome::Failure { .. } => OutcomeKind::Failure,
            Outcome::Continuation { .. } => OutcomeKind::Continuation,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::Success { message }
            | Outcome::Failure { message }
            | Outcome::Continuation { message, .. } => message,
        }
    }
}

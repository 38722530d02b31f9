pub mod env;
pub mod invocation;
pub mod outcome;
pub mod params;

pub use invocation::{ActionConfiguration, JobConfiguration, JobData, PipelineJob, PipelineJobEvent};
pub use outcome::{ContinuationToken, Outcome, OutcomeKind};
pub use params::UserParameters;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

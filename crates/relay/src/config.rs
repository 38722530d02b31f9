use model::env::STATUS_RELAY_FAULT_POLICY;
use std::str::FromStr;
use thiserror::Error;

/// What to do with a fault raised before the job result could be reported.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Report the fault to the pipeline as a job failure when the job id is known
    #[default]
    Report,
    /// Only log the fault. The pipeline stage waits until its own timeout.
    Log,
}

impl FromStr for FaultPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "report" => Ok(FaultPolicy::Report),
            "log" => Ok(FaultPolicy::Log),
            _ => Err(ConfigError::InvalidValue {
                variable: STATUS_RELAY_FAULT_POLICY,
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {variable}")]
    InvalidValue {
        variable: &'static str,
        value: String,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub fault_policy: FaultPolicy,
}

impl RelayConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration using `lookup` to resolve variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let fault_policy: FaultPolicy = match lookup(STATUS_RELAY_FAULT_POLICY) {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => FaultPolicy::default(),
        };

        Ok(RelayConfig { fault_policy })
    }
}

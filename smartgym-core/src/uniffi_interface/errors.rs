use thiserror::Error as ThisError;
use uniffi::Error;

#[derive(Debug, ThisError, Error)]
#[non_exhaustive]
pub enum SmartGymError {
    #[error("error: {0}")]
    Common(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<anyhow::Error> for SmartGymError {
    fn from(e: anyhow::Error) -> Self {
        SmartGymError::Common(e.to_string())
    }
}

impl From<String> for SmartGymError {
    fn from(s: String) -> Self {
        SmartGymError::Common(s)
    }
}

impl From<&str> for SmartGymError {
    fn from(s: &str) -> Self {
        SmartGymError::Common(s.to_string())
    }
}

impl From<uniffi::UnexpectedUniFFICallbackError> for SmartGymError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        SmartGymError::Common(e.reason)
    }
}

impl SmartGymError {
    pub fn with_display<D: std::fmt::Display>(d: D) -> Self {
        SmartGymError::Common(d.to_string())
    }
}

use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `SimulationError` and maps other errors to
/// convert to a `SimulationError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SimulationError {
    /// A parameter was out of range or inconsistent with another parameter.
    /// Always raised before any output is allocated.
    InvalidParameter { field: String, reason: String },
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    ScenarioError(String),
}

impl SimulationError {
    pub fn invalid_parameter(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SimulationError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The offending field, if this is an `InvalidParameter` error.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            SimulationError::InvalidParameter { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Prefixes the field of an `InvalidParameter` error with `scope`, e.g. a disease id.
    #[must_use]
    pub(crate) fn scoped(self, scope: &str) -> Self {
        match self {
            SimulationError::InvalidParameter { field, reason } => {
                SimulationError::InvalidParameter {
                    field: format!("{scope}.{field}"),
                    reason,
                }
            }
            other => other,
        }
    }
}

impl From<io::Error> for SimulationError {
    fn from(error: io::Error) -> Self {
        SimulationError::IoError(error)
    }
}

impl From<serde_json::Error> for SimulationError {
    fn from(error: serde_json::Error) -> Self {
        SimulationError::JsonError(error)
    }
}

impl From<csv::Error> for SimulationError {
    fn from(error: csv::Error) -> Self {
        SimulationError::CSVError(error)
    }
}

impl From<String> for SimulationError {
    fn from(error: String) -> Self {
        SimulationError::ScenarioError(error)
    }
}

impl From<&str> for SimulationError {
    fn from(error: &str) -> Self {
        SimulationError::ScenarioError(error.to_string())
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::IoError(error) => Some(error),
            SimulationError::JsonError(error) => Some(error),
            SimulationError::CSVError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimulationError::InvalidParameter { field, reason } => {
                write!(f, "Error: invalid parameter `{field}`: {reason}")
            }
            SimulationError::IoError(error) => write!(f, "Error: {error}"),
            SimulationError::JsonError(error) => write!(f, "Error: invalid JSON: {error}"),
            SimulationError::CSVError(error) => write!(f, "Error: CSV: {error}"),
            SimulationError::ScenarioError(message) => write!(f, "Error: {message}"),
        }
    }
}

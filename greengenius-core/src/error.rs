use thiserror::Error;

/// Contract violation in caller-supplied analysis input.
///
/// Only the sensor snapshot has required fields; plant requirement records
/// never produce this error (missing values fall back to defaults).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{what} must be a JSON object")]
    NotAnObject { what: &'static str },

    #[error("sensor data is missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("sensor field '{field}' must be a number")]
    NotANumber { field: &'static str },
}

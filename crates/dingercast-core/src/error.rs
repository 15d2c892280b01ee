// Error kinds surfaced by the simulation engine.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Trial count, plate-appearance range, split share, or rate is unusable.
    #[error("invalid configuration for `{field}`: {message}")]
    InvalidConfiguration { field: String, message: String },

    /// A query against a finished result was out of range.
    #[error("invalid argument `{field}`: {message}")]
    InvalidArgument { field: String, message: String },
}

impl SimError {
    pub(crate) fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        SimError::InvalidConfiguration {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        SimError::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Reject anything outside [0, 1], NaN included.
pub(crate) fn check_probability(field: &str, value: f64) -> Result<(), SimError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::config(
            field,
            format!("must be between 0.0 and 1.0 inclusive, got {value}"),
        ))
    }
}

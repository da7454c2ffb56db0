use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReitDcfError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (last step: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: f64,
    },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ReitDcfError {
    fn from(e: serde_json::Error) -> Self {
        ReitDcfError::SerializationError(e.to_string())
    }
}

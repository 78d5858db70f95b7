use thiserror::Error;

#[derive(Debug, Error)]
pub enum HouseholdFinanceError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl HouseholdFinanceError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        HouseholdFinanceError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for HouseholdFinanceError {
    fn from(e: serde_json::Error) -> Self {
        HouseholdFinanceError::SerializationError(e.to_string())
    }
}

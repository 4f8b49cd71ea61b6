use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropertyFinanceError {
    #[error("Invalid loan parameters: {field} — {reason}")]
    InvalidLoanParameters { field: String, reason: String },

    #[error("Missing rate data: {0}")]
    MissingRateData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PropertyFinanceError {
    fn from(e: serde_json::Error) -> Self {
        PropertyFinanceError::SerializationError(e.to_string())
    }
}

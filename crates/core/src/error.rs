#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown form field: {path}")]
    UnknownField { path: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

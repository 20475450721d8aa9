use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation { message: String, missing: Vec<String> },
    #[error("{0}")]
    NotFound(String),
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl ServiceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), missing: Vec::new() }
    }

    pub fn missing_fields(message: impl Into<String>, missing: Vec<String>) -> Self {
        Self::Validation { message: message.into(), missing }
    }

    pub fn not_found(message: &str) -> Self { Self::NotFound(message.to_string()) }

    pub fn persistence(e: impl std::fmt::Display) -> Self { Self::Persistence(e.to_string()) }
}

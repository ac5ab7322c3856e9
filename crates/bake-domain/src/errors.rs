// errors.rs
use thiserror::Error;

/// Error de dominio para los tipos del plano de control (instancias,
/// imágenes y sus enumeraciones de ciclo de vida).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),
}

// Conversión desde serde_json::Error a DomainError
impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::SerializationError(e.to_string())
    }
}

use thiserror::Error;

/// Top-level error type for the Nimbus system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for NimbusError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NimbusError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("AI error: {0}")]
    Ai(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for NimbusError {
    fn from(err: toml::de::Error) -> Self {
        NimbusError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for NimbusError {
    fn from(err: toml::ser::Error) -> Self {
        NimbusError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for NimbusError {
    fn from(err: serde_json::Error) -> Self {
        NimbusError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Nimbus operations.
pub type Result<T> = std::result::Result<T, NimbusError>;

pub mod config;
pub mod error;

pub use config::{GeminiConfig, NimbusConfig, RetryConfig, ServerConfig};
pub use error::{NimbusError, Result};

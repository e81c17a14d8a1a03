//! CLI argument definitions for the Nimbus service.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Nimbus, a REST gateway over the Gemini generative-AI backend.
#[derive(Parser, Debug)]
#[command(name = "nimbus", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > NIMBUS_CONFIG env var > ~/.nimbus/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("NIMBUS_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > NIMBUS_PORT env var > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Ok(val) = std::env::var("NIMBUS_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        config_port
    }

    /// Resolve the log level. Returns `None` if not overridden.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".nimbus").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(config: Option<&str>, port: Option<u16>, log_level: Option<&str>) -> CliArgs {
        CliArgs {
            config: config.map(PathBuf::from),
            port,
            log_level: log_level.map(String::from),
        }
    }

    #[test]
    fn test_config_flag_wins() {
        let cli = args(Some("/tmp/custom.toml"), None, None);
        assert_eq!(cli.resolve_config_path(), PathBuf::from("/tmp/custom.toml"));
    }

    #[test]
    fn test_port_flag_wins_over_config() {
        let cli = args(None, Some(9999), None);
        assert_eq!(cli.resolve_port(8000), 9999);
    }

    #[test]
    fn test_port_falls_back_to_config() {
        let cli = args(None, None, None);
        if std::env::var("NIMBUS_PORT").is_err() {
            assert_eq!(cli.resolve_port(8000), 8000);
        }
    }

    #[test]
    fn test_log_level_passthrough() {
        let cli = args(None, None, Some("debug"));
        assert_eq!(cli.resolve_log_level().as_deref(), Some("debug"));

        let cli = args(None, None, None);
        assert!(cli.resolve_log_level().is_none());
    }
}

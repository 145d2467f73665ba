//! Configuration loading from disk and environment.

use std::env;
use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variables recognized as overrides. These are deployment
/// inputs (mode, rate-limit numerics, bypass, storage root), not a parallel
/// config file.
pub const ENV_MODE: &str = "GATEWAY_MODE";
pub const ENV_RATE_LIMIT_MAX_POINTS: &str = "GATEWAY_RATE_LIMIT_MAX_POINTS";
pub const ENV_RATE_LIMIT_WINDOW_SECS: &str = "GATEWAY_RATE_LIMIT_WINDOW_SECS";
pub const ENV_RATE_LIMIT_BYPASS: &str = "GATEWAY_RATE_LIMIT_BYPASS";
pub const ENV_UPLOAD_ROOT: &str = "GATEWAY_UPLOAD_ROOT";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, then apply environment
/// overrides.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: GatewayConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Default configuration with environment overrides applied and validated.
/// Used when no config file is given.
pub fn default_config() -> Result<GatewayConfig, ConfigError> {
    let mut config = GatewayConfig::default();
    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply recognized environment overrides in place.
///
/// Unparsable values are ignored with a warning rather than failing startup;
/// semantic validation still runs on the final result.
pub fn apply_env_overrides(config: &mut GatewayConfig) {
    if let Ok(raw) = env::var(ENV_MODE) {
        match raw.parse() {
            Ok(mode) => config.mode = mode,
            Err(e) => tracing::warn!(var = ENV_MODE, value = %raw, error = %e, "Ignoring override"),
        }
    }

    if let Ok(raw) = env::var(ENV_RATE_LIMIT_MAX_POINTS) {
        match raw.parse::<u32>() {
            Ok(v) => config.rate_limit.max_points = Some(v),
            Err(e) => {
                tracing::warn!(var = ENV_RATE_LIMIT_MAX_POINTS, value = %raw, error = %e, "Ignoring override")
            }
        }
    }

    if let Ok(raw) = env::var(ENV_RATE_LIMIT_WINDOW_SECS) {
        match raw.parse::<u64>() {
            Ok(v) => config.rate_limit.window_secs = Some(v),
            Err(e) => {
                tracing::warn!(var = ENV_RATE_LIMIT_WINDOW_SECS, value = %raw, error = %e, "Ignoring override")
            }
        }
    }

    if let Ok(raw) = env::var(ENV_RATE_LIMIT_BYPASS) {
        config.rate_limit.bypass = matches!(raw.as_str(), "1" | "true" | "yes");
    }

    if let Ok(raw) = env::var(ENV_UPLOAD_ROOT) {
        if !raw.is_empty() {
            config.uploads.root_dir = raw;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::DeploymentMode;
    use std::io::Write;

    #[test]
    fn test_load_minimal_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
mode = "production"

[listener]
bind_address = "127.0.0.1:9000"

[rate_limit]
max_points = 50
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.mode, DeploymentMode::Production);
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.rate_limit.max_points, Some(50));
        // Unspecified sections fall back to defaults.
        assert_eq!(config.uploads.root_dir, "uploads");
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "mode = [not toml").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[rate_limit]
window_secs = 0
"#
        )
        .unwrap();
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }
}

//! Configuration file parsing (HOCON format).

use std::path::Path;

use hocon::HoconLoader;
use tracing::info;

use crate::common::error::ConfigError;
use crate::config::env::apply_env_overrides;
use crate::config::types::Config;
use crate::config::validate::validate_config;

/// Load configuration from a HOCON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    HoconLoader::new()
        .load_file(path)
        .map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

/// Load configuration from a HOCON string.
#[cfg(test)]
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    HoconLoader::new()
        .load_str(content)
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

/// Load the config file if present, apply environment overrides and validate.
///
/// A missing file is not an error: every setting has a default and the token
/// usually arrives through the environment.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    let config = if path.exists() {
        load_config(path)?
    } else {
        info!("No config file at {}, using defaults", path.display());
        Config::default()
    };

    let config = apply_env_overrides(config);
    validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{DEFAULT_COMMAND_PREFIX, DEFAULT_LOGGER_CHANNEL_NAME};

    #[test]
    fn test_load_full_config() {
        let config = load_config_str(
            r#"
            discord {
              token = "abc"
              command_prefix = "!"
              owner_id = 404687039905136661
              activity = "the logs"
            }
            logger {
              channel_name = "audit"
              state_file = "state/logger.json"
            }
            "#,
        )
        .unwrap();

        assert_eq!(config.discord.token, "abc");
        assert_eq!(config.discord.command_prefix, "!");
        assert_eq!(config.discord.owner_id, Some(404687039905136661));
        assert_eq!(config.discord.activity.as_deref(), Some("the logs"));
        assert_eq!(config.logger.channel_name, "audit");
        assert_eq!(config.logger.state_file, "state/logger.json");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = load_config_str(r#"discord { token = "abc" }"#).unwrap();

        assert_eq!(config.discord.command_prefix, DEFAULT_COMMAND_PREFIX);
        assert_eq!(config.discord.owner_id, None);
        assert_eq!(config.logger.channel_name, DEFAULT_LOGGER_CHANNEL_NAME);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_config("/definitely/not/here/quanta.conf");
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }
}

//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Discord's limit on channel names.
const MAX_CHANNEL_NAME_LEN: usize = 100;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // Validate Discord config
    if config.discord.token.is_empty() {
        errors.push(
            "discord.token is required (set QUANTA_DISCORD_TOKEN or TOKEN)".to_string(),
        );
    }
    if config.discord.token == "YOUR_DISCORD_TOKEN_HERE" {
        errors.push("discord.token has not been configured (still using placeholder)".to_string());
    }
    if config.discord.command_prefix.trim().is_empty() {
        errors.push("discord.command_prefix must not be empty".to_string());
    }
    if config.discord.owner_id == Some(0) {
        errors.push("discord.owner_id must be non-zero".to_string());
    }

    // Validate logger config
    let name_len = config.logger.channel_name.chars().count();
    if name_len == 0 {
        errors.push("logger.channel_name is required".to_string());
    }
    if name_len > MAX_CHANNEL_NAME_LEN {
        errors.push(format!(
            "logger.channel_name must be at most {} characters (got {})",
            MAX_CHANNEL_NAME_LEN, name_len
        ));
    }
    if config.logger.state_file.is_empty() {
        errors.push("logger.state_file is required".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_valid_config() -> Config {
        let mut config = Config::default();
        config.discord.token = "valid_token_here".to_string();
        config.discord.owner_id = Some(404687039905136661);
        config
    }

    #[test]
    fn test_valid_config_passes() {
        let config = make_valid_config();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_token_fails() {
        let mut config = make_valid_config();
        config.discord.token = String::new();

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("discord.token"));
    }

    #[test]
    fn test_placeholder_token_fails() {
        let mut config = make_valid_config();
        config.discord.token = "YOUR_DISCORD_TOKEN_HERE".to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("placeholder"));
    }

    #[test]
    fn test_blank_prefix_fails() {
        let mut config = make_valid_config();
        config.discord.command_prefix = "  ".to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("command_prefix"));
    }

    #[test]
    fn test_long_channel_name_fails() {
        let mut config = make_valid_config();
        config.logger.channel_name = "x".repeat(101);

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("at most 100"));
    }

    #[test]
    fn test_errors_are_collected() {
        let mut config = make_valid_config();
        config.discord.token = String::new();
        config.logger.state_file = String::new();

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("discord.token"));
        assert!(message.contains("logger.state_file"));
    }
}

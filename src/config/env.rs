//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `QUANTA_DISCORD_TOKEN` - Discord bot token (`TOKEN` is accepted as a fallback)
//! - `QUANTA_OWNER_ID` - User that receives `directme` reports
//! - `QUANTA_COMMAND_PREFIX` - Command prefix
//! - `QUANTA_STATE_FILE` - Logger state file path

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "QUANTA";

/// Unprefixed token variable kept for existing `.env` files.
const LEGACY_TOKEN_VAR: &str = "TOKEN";

/// Apply environment variable overrides to a config.
///
/// This allows the token to be provided via the environment (or a `.env`
/// file) instead of the config file.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_from(config, |key| env::var(key).ok())
}

/// Apply overrides using an arbitrary variable lookup.
pub fn apply_overrides_from<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(&format!("{}_{}", ENV_PREFIX, name)).filter(|v| !v.is_empty());

    // Discord token
    if let Some(token) = var("DISCORD_TOKEN").or_else(|| lookup(LEGACY_TOKEN_VAR).filter(|v| !v.is_empty())) {
        config.discord.token = token;
    }

    if let Some(owner) = var("OWNER_ID") {
        if let Ok(id) = owner.parse() {
            config.discord.owner_id = Some(id);
        }
    }
    if let Some(prefix) = var("COMMAND_PREFIX") {
        config.discord.command_prefix = prefix;
    }
    if let Some(path) = var("STATE_FILE") {
        config.logger.state_file = path;
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `QUANTA_CONFIG` environment variable, otherwise returns "quanta.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "quanta.conf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(ENV_PREFIX, "QUANTA");
    }

    #[test]
    fn test_no_vars_leaves_config_unchanged() {
        let mut config = Config::default();
        config.discord.token = "file_token".to_string();

        let result = apply_overrides_from(config, lookup(&[]));

        assert_eq!(result.discord.token, "file_token");
        assert_eq!(result.discord.owner_id, None);
    }

    #[test]
    fn test_prefixed_token_wins_over_legacy() {
        let result = apply_overrides_from(
            Config::default(),
            lookup(&[("QUANTA_DISCORD_TOKEN", "new"), ("TOKEN", "legacy")]),
        );
        assert_eq!(result.discord.token, "new");
    }

    #[test]
    fn test_legacy_token_fallback() {
        let result = apply_overrides_from(Config::default(), lookup(&[("TOKEN", "legacy")]));
        assert_eq!(result.discord.token, "legacy");
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let mut config = Config::default();
        config.discord.token = "kept".to_string();

        let result = apply_overrides_from(config, lookup(&[("QUANTA_DISCORD_TOKEN", "")]));
        assert_eq!(result.discord.token, "kept");
    }

    #[test]
    fn test_owner_and_paths() {
        let result = apply_overrides_from(
            Config::default(),
            lookup(&[
                ("QUANTA_OWNER_ID", "42"),
                ("QUANTA_COMMAND_PREFIX", "!"),
                ("QUANTA_STATE_FILE", "/data/logger.json"),
            ]),
        );
        assert_eq!(result.discord.owner_id, Some(42));
        assert_eq!(result.discord.command_prefix, "!");
        assert_eq!(result.logger.state_file, "/data/logger.json");
    }

    #[test]
    fn test_invalid_owner_id_is_ignored() {
        let result = apply_overrides_from(Config::default(), lookup(&[("QUANTA_OWNER_ID", "me")]));
        assert_eq!(result.discord.owner_id, None);
    }
}

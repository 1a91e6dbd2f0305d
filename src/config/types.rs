//! Configuration type definitions.

use serde::Deserialize;

/// Default command prefix (`qsetup`, `qhelp`, ...).
pub const DEFAULT_COMMAND_PREFIX: &str = "q";

/// Default name of the provisioned logging channel.
pub const DEFAULT_LOGGER_CHANNEL_NAME: &str = "📝-logger";

/// Default path of the persisted logger state.
pub const DEFAULT_STATE_FILE: &str = "config.json";

/// Default "watching" activity shown on the bot profile.
pub const DEFAULT_ACTIVITY: &str = "the systems | QuantaAI";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub discord: DiscordConfig,
    pub logger: LoggerConfig,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub token: String,
    pub command_prefix: String,
    /// Recipient of `directme` reports.
    pub owner_id: Option<u64>,
    pub activity: Option<String>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            owner_id: None,
            activity: Some(DEFAULT_ACTIVITY.to_string()),
        }
    }
}

/// Event logger settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Name used to find or create the logging channel on `setup`.
    pub channel_name: String,
    /// JSON file holding the destination channel id.
    pub state_file: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            channel_name: DEFAULT_LOGGER_CHANNEL_NAME.to_string(),
            state_file: DEFAULT_STATE_FILE.to_string(),
        }
    }
}

use chrono_tz::Tz;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{FeedError, FeedResult};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub server: ServerConfig,
    pub channels: ChannelsConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelsConfig {
    /// Channel ids accepted by the feed endpoint, e.g. `-1002472833194`.
    #[serde(default)]
    pub allowed: Vec<String>,

    #[serde(default = "default_max_messages")]
    pub max_messages_per_channel: usize,

    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,

    #[serde(default = "default_store_capacity")]
    pub store_max_capacity: u64,
}

#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub timezone: Tz,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    #[serde(default = "default_enable_console")]
    pub console: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(FeedError::config(format!("Unknown log format '{other}'"))),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> FeedResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> FeedResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("TELOXIDE_TOKEN")
            .or_else(|| lookup("BOT_TOKEN"))
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                FeedError::config("TELOXIDE_TOKEN or BOT_TOKEN environment variable not set")
            })?;

        let timezone_name = lookup("FEED_TIMEZONE").unwrap_or_else(default_timezone);
        let timezone = timezone_name.trim().parse::<Tz>().map_err(|e| {
            FeedError::config(format!("Invalid FEED_TIMEZONE '{timezone_name}': {e}"))
        })?;

        let format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>()?,
            None => default_log_format(),
        };

        Ok(AppConfig {
            telegram: TelegramConfig {
                bot_token,
                request_timeout_secs: parse_var(
                    &lookup,
                    "TELEGRAM_REQUEST_TIMEOUT_SECS",
                    default_request_timeout(),
                )?,
            },
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(default_host),
                port: parse_var(&lookup, "SERVER_PORT", default_port())?,
            },
            channels: ChannelsConfig {
                allowed: lookup("ALLOWED_CHANNELS")
                    .map(|raw| parse_channel_list(&raw))
                    .unwrap_or_default(),
                max_messages_per_channel: parse_var(
                    &lookup,
                    "CHANNEL_MAX_MESSAGES",
                    default_max_messages(),
                )?,
                retention_secs: parse_var(
                    &lookup,
                    "CHANNEL_RETENTION_SECS",
                    default_retention_secs(),
                )?,
                store_max_capacity: parse_var(
                    &lookup,
                    "STORE_MAX_CAPACITY",
                    default_store_capacity(),
                )?,
            },
            display: DisplayConfig { timezone },
            logging: LoggingConfig {
                level: lookup("RUST_LOG").unwrap_or_else(default_log_level),
                format,
                console: default_enable_console(),
            },
        })
    }

    pub fn http_timeout(&self) -> Duration {
        self.telegram.request_timeout()
    }
}

impl TelegramConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ChannelsConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> FeedResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| FeedError::config(format!("Invalid value for {key} ('{raw}'): {e}"))),
        None => Ok(default),
    }
}

fn parse_channel_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

fn default_request_timeout() -> u64 {
    30
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_max_messages() -> usize {
    100
}
fn default_retention_secs() -> u64 {
    7 * 24 * 60 * 60
}
fn default_store_capacity() -> u64 {
    10_000
}
fn default_timezone() -> String {
    "UTC".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}
fn default_enable_console() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[("BOT_TOKEN", "test_token_123")]))
            .unwrap();

        assert_eq!(config.telegram.bot_token, "test_token_123");
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
        assert_eq!(config.server.address(), "0.0.0.0:3000");
        assert!(config.channels.allowed.is_empty());
        assert_eq!(config.channels.max_messages_per_channel, 100);
        assert_eq!(config.display.timezone, Tz::UTC);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_teloxide_token_takes_precedence() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("TELOXIDE_TOKEN", "primary"),
            ("BOT_TOKEN", "secondary"),
        ]))
        .unwrap();

        assert_eq!(config.telegram.bot_token, "primary");
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let result = AppConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(FeedError::Config { .. })));
    }

    #[test]
    fn test_allowed_channels_are_split_and_trimmed() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("BOT_TOKEN", "t"),
            ("ALLOWED_CHANNELS", " -1002472833194, ,-100123 "),
        ]))
        .unwrap();

        assert_eq!(
            config.channels.allowed,
            vec!["-1002472833194".to_string(), "-100123".to_string()]
        );
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("BOT_TOKEN", "t"),
            ("SERVER_PORT", "8080"),
            ("FEED_TIMEZONE", "Asia/Shanghai"),
            ("LOG_FORMAT", "JSON"),
            ("CHANNEL_MAX_MESSAGES", "20"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.display.timezone, chrono_tz::Asia::Shanghai);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.channels.max_messages_per_channel, 20);
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        let bad_port =
            AppConfig::from_lookup(lookup_from(&[("BOT_TOKEN", "t"), ("SERVER_PORT", "http")]));
        assert!(matches!(bad_port, Err(FeedError::Config { .. })));

        let bad_zone = AppConfig::from_lookup(lookup_from(&[
            ("BOT_TOKEN", "t"),
            ("FEED_TIMEZONE", "Mars/Olympus"),
        ]));
        assert!(matches!(bad_zone, Err(FeedError::Config { .. })));

        let bad_format =
            AppConfig::from_lookup(lookup_from(&[("BOT_TOKEN", "t"), ("LOG_FORMAT", "xml")]));
        assert!(matches!(bad_format, Err(FeedError::Config { .. })));
    }
}

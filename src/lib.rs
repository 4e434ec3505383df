pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;
use teloxide::Bot;

pub use config::AppConfig;
pub use errors::{FeedError, FeedResult, UserFriendlyError};
pub use handlers::{
    channel_post_handler, reaction_count_handler, router, AppState, ChannelPostHandler, FeedQuery,
};
pub use models::{ChannelMessage, Entity, EntityKind, FeedRecord, Reaction, YearGroups};
pub use services::{ChannelStore, ChannelValidator, FeedService, MessageSource};

pub fn init_logging(config: &config::LoggingConfig) -> Result<(), FeedError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format {
        config::LogFormat::Json => {
            subscriber
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .map_err(|e| {
                    FeedError::config(format!("Failed to initialize JSON logging: {e}"))
                })?;
        }
        config::LogFormat::Pretty => {
            subscriber
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_file(false)
                        .with_line_number(false)
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_ansi(config.console)
                        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::NONE),
                )
                .try_init()
                .map_err(|e| {
                    FeedError::config(format!("Failed to initialize pretty logging: {e}"))
                })?;
        }
        config::LogFormat::Compact => {
            subscriber
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_ansi(config.console)
                        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::NONE),
                )
                .try_init()
                .map_err(|e| {
                    FeedError::config(format!("Failed to initialize compact logging: {e}"))
                })?;
        }
    }

    Ok(())
}

/// Builds the bot with the configured request timeout. The timeout must stay
/// above the long-polling timeout or polling requests are cut short.
pub fn create_bot(config: &config::TelegramConfig) -> FeedResult<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| FeedError::internal(format!("Failed to create HTTP client: {e}")))?;

    Ok(Bot::with_client(config.bot_token.clone(), client))
}

pub fn create_services(config: &AppConfig) -> (Arc<ChannelStore>, Arc<FeedService>) {
    let store = Arc::new(ChannelStore::new(&config.channels));
    let feed = Arc::new(FeedService::new(
        Arc::clone(&store) as Arc<dyn MessageSource>,
        config.display.timezone,
    ));

    (store, feed)
}

pub fn create_handlers(
    config: &AppConfig,
    store: Arc<ChannelStore>,
    feed: Arc<FeedService>,
) -> (ChannelPostHandler, AppState) {
    let validator = Arc::new(ChannelValidator::new(config.channels.allowed.clone()));
    let post_handler = ChannelPostHandler::new(store, Arc::clone(&validator));
    let state = AppState { feed, validator };

    (post_handler, state)
}

#[cfg(test)]
mod logging_tests {
    use super::*;

    #[test]
    fn test_logging_levels() {
        let config = config::LoggingConfig {
            level: "info".to_string(),
            format: config::LogFormat::Pretty,
            console: true,
        };

        init_logging(&config).unwrap();

        tracing::debug!("This debug message should not appear");
        tracing::info!("This info message should appear");
        tracing::warn!("This warning message should appear");
    }
}

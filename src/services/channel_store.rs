use async_trait::async_trait;
use moka::future::Cache;
use teloxide::types::ChatId;
use tracing::debug;

use crate::config::ChannelsConfig;
use crate::errors::FeedResult;
use crate::models::{ChannelMessage, Reaction};

#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Messages of `channel`, newest first.
    async fn channel_messages(&self, channel: ChatId) -> FeedResult<Vec<ChannelMessage>>;
}

/// In-memory buffer of channel posts received by the bot.
///
/// Entries are keyed by `(chat id, message id)`, so an edited post replaces
/// the earlier version. Capacity and retention are bounded by
/// [`ChannelsConfig`]; nothing survives a restart.
pub struct ChannelStore {
    messages: Cache<(i64, i32), ChannelMessage>,
    max_per_channel: usize,
}

impl ChannelStore {
    pub fn new(config: &ChannelsConfig) -> Self {
        let messages = Cache::builder()
            .time_to_live(config.retention())
            .max_capacity(config.store_max_capacity)
            .build();

        Self {
            messages,
            max_per_channel: config.max_messages_per_channel,
        }
    }

    pub async fn record(&self, channel: ChatId, message: ChannelMessage) {
        debug!(channel = channel.0, message_id = message.id, "Recording channel post");
        self.messages.insert((channel.0, message.id), message).await;
    }

    /// Replaces the reaction counts of a buffered post. Returns `false` when
    /// the post is not buffered (never seen, evicted or expired).
    pub async fn update_reactions(
        &self,
        channel: ChatId,
        message_id: i32,
        reactions: Vec<Reaction>,
    ) -> bool {
        let key = (channel.0, message_id);
        let Some(mut message) = self.messages.get(&key).await else {
            debug!(channel = channel.0, message_id, "Reactions for unknown post");
            return false;
        };

        message.reactions = reactions;
        self.messages.insert(key, message).await;
        true
    }
}

#[async_trait]
impl MessageSource for ChannelStore {
    async fn channel_messages(&self, channel: ChatId) -> FeedResult<Vec<ChannelMessage>> {
        let mut messages: Vec<ChannelMessage> = self
            .messages
            .iter()
            .filter(|(key, _)| key.0 == channel.0)
            .map(|(_, message)| message)
            .collect();

        messages.sort_by(|a, b| b.id.cmp(&a.id));
        messages.truncate(self.max_per_channel);

        Ok(messages)
    }
}

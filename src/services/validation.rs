use std::collections::HashSet;
use teloxide::types::ChatId;

use crate::errors::{FeedError, FeedResult, INVALID_CHANNEL_MESSAGE};
use crate::utils::is_empty_or_whitespace;

/// Allow-list check for channel identifiers.
#[derive(Debug, Clone, Default)]
pub struct ChannelValidator {
    allowed: HashSet<String>,
}

impl ChannelValidator {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn validate(&self, channel: Option<&str>) -> FeedResult<ChatId> {
        let channel = channel
            .filter(|id| !is_empty_or_whitespace(id))
            .filter(|id| self.allowed.contains(*id))
            .ok_or_else(|| FeedError::invalid_channel(INVALID_CHANNEL_MESSAGE))?;

        channel
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| FeedError::invalid_channel(INVALID_CHANNEL_MESSAGE))
    }

    pub fn allows(&self, channel: ChatId) -> bool {
        self.allowed.contains(&channel.0.to_string())
    }
}

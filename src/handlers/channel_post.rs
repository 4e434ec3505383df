use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::MessageReactionCountUpdated;
use tracing::{debug, info};

use crate::models::{ChannelMessage, Reaction};
use crate::services::{ChannelStore, ChannelValidator};

/// Buffers posts (and edits) from allow-listed channels.
pub struct ChannelPostHandler {
    store: Arc<ChannelStore>,
    validator: Arc<ChannelValidator>,
}

impl ChannelPostHandler {
    pub fn new(store: Arc<ChannelStore>, validator: Arc<ChannelValidator>) -> Self {
        Self { store, validator }
    }

    pub async fn handle(&self, msg: Message) -> ResponseResult<()> {
        if !self.validator.allows(msg.chat.id) {
            debug!("Ignoring post from channel {} not on the allow-list", msg.chat.id.0);
            return Ok(());
        }

        let Some(message) = ChannelMessage::from_telegram(&msg) else {
            debug!("Skipping service message {} in {}", msg.id.0, msg.chat.id.0);
            return Ok(());
        };

        info!("📥 Channel {} post {} buffered", msg.chat.id.0, message.id);
        self.store.record(msg.chat.id, message).await;

        Ok(())
    }

    /// Applies anonymous reaction counts, which is how channel posts report
    /// reactions to bots that administer the channel.
    pub async fn handle_reactions(
        &self,
        update: MessageReactionCountUpdated,
    ) -> ResponseResult<()> {
        if !self.validator.allows(update.chat.id) {
            return Ok(());
        }

        let reactions: Vec<Reaction> = update
            .reactions
            .iter()
            .filter_map(Reaction::from_telegram)
            .collect();

        if self
            .store
            .update_reactions(update.chat.id, update.message_id.0, reactions)
            .await
        {
            debug!(
                "Channel {} post {} reactions updated",
                update.chat.id.0, update.message_id.0
            );
        }

        Ok(())
    }
}

pub async fn channel_post_handler(
    msg: Message,
    handler: Arc<ChannelPostHandler>,
) -> ResponseResult<()> {
    handler.handle(msg).await
}

pub async fn reaction_count_handler(
    update: MessageReactionCountUpdated,
    handler: Arc<ChannelPostHandler>,
) -> ResponseResult<()> {
    handler.handle_reactions(update).await
}

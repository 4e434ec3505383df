use chrono_tz::Tz;
use std::sync::Arc;
use teloxide::types::ChatId;
use tracing::{info, instrument};

use crate::errors::FeedResult;
use crate::models::feed::group_by_year;
use crate::models::{FeedRecord, YearGroups};
use crate::services::MessageSource;

pub struct FeedService {
    source: Arc<dyn MessageSource>,
    timezone: Tz,
}

impl FeedService {
    pub fn new(source: Arc<dyn MessageSource>, timezone: Tz) -> Self {
        Self { source, timezone }
    }

    #[instrument(skip(self))]
    pub async fn channel_feed(&self, channel: ChatId) -> FeedResult<YearGroups> {
        let messages = self.source.channel_messages(channel).await?;

        let records = messages
            .iter()
            .map(|message| FeedRecord::from_message(message, &self.timezone));
        let groups = group_by_year(records);

        info!(
            "Rendered {} of {} messages into {} year groups",
            groups.values().map(Vec::len).sum::<usize>(),
            messages.len(),
            groups.len()
        );

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FeedError;
    use crate::models::{ChannelMessage, Entity};
    use async_trait::async_trait;

    struct StaticSource(Vec<ChannelMessage>);

    #[async_trait]
    impl MessageSource for StaticSource {
        async fn channel_messages(&self, _channel: ChatId) -> FeedResult<Vec<ChannelMessage>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl MessageSource for FailingSource {
        async fn channel_messages(&self, _channel: ChatId) -> FeedResult<Vec<ChannelMessage>> {
            Err(FeedError::upstream("timed out"))
        }
    }

    #[tokio::test]
    async fn test_channel_feed_formats_and_groups() {
        let source = StaticSource(vec![
            ChannelMessage::new(3, 1_704_067_260, "Release notes")
                .with_entities(vec![Entity::bold(0, 7)]),
            ChannelMessage::new(2, 1_704_067_200, ""),
            ChannelMessage::new(1, 1_700_000_000, "see http://example.com")
                .with_entities(vec![Entity::url(4, 18)]),
        ]);
        let service = FeedService::new(Arc::new(source), Tz::UTC);

        let groups = service.channel_feed(ChatId(-100)).await.unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["2024"].len(), 1);
        assert_eq!(groups["2024"][0].message, "**Release** notes");
        assert_eq!(groups["2024"][0].title, "01-01");
        assert_eq!(
            groups["2023"][0].message,
            "see [http://example.com](http://example.com)"
        );
        assert_eq!(groups["2023"][0].date, "2023-11-14 22:13:20");
    }

    #[tokio::test]
    async fn test_channel_feed_propagates_source_errors() {
        let service = FeedService::new(Arc::new(FailingSource), Tz::UTC);
        let result = service.channel_feed(ChatId(-100)).await;
        assert!(matches!(result, Err(FeedError::Upstream { .. })));
    }

    #[tokio::test]
    async fn test_channel_feed_empty() {
        let service = FeedService::new(Arc::new(StaticSource(vec![])), Tz::UTC);
        assert!(service.channel_feed(ChatId(-100)).await.unwrap().is_empty());
    }
}

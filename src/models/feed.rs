use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{ChannelMessage, Entity, Reaction};
use crate::utils::format_entities;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TITLE_FORMAT: &str = "%m-%d";

/// Year (as a string key) to the records posted in that year.
pub type YearGroups = BTreeMap<String, Vec<FeedRecord>>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRecord {
    pub id: i32,
    pub date: String,
    pub updated_at: String,
    pub message: String,
    pub views: Option<u32>,
    pub reply_count: Option<u32>,
    pub reactions: Vec<Reaction>,
    pub title: String,
    pub entities: Option<Vec<Entity>>,
    #[serde(skip)]
    pub year: i32,
}

impl FeedRecord {
    pub fn from_message(message: &ChannelMessage, timezone: &Tz) -> Self {
        let posted_at = DateTime::<Utc>::from_timestamp(message.date, 0)
            .unwrap_or_default()
            .with_timezone(timezone);
        let date = posted_at.format(DATE_FORMAT).to_string();

        Self {
            id: message.id,
            updated_at: date.clone(),
            date,
            message: format_entities(&message.text, message.entities.as_deref()),
            views: message.views,
            reply_count: message.reply_count.filter(|&count| count > 0),
            reactions: message.reactions.clone(),
            title: posted_at.format(TITLE_FORMAT).to_string(),
            entities: message.entities.clone(),
            year: posted_at.year(),
        }
    }

    pub fn has_message(&self) -> bool {
        !self.message.is_empty()
    }
}

/// Groups records by year, dropping records whose rendered text is empty.
/// Records keep their relative order inside each year.
pub fn group_by_year(records: impl IntoIterator<Item = FeedRecord>) -> YearGroups {
    let mut groups = YearGroups::new();
    for record in records.into_iter().filter(FeedRecord::has_message) {
        groups
            .entry(record.year.to_string())
            .or_default()
            .push(record);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // 2024-01-01 00:00:00 UTC
    const NEW_YEAR_2024: i64 = 1_704_067_200;

    #[test]
    fn test_record_fields() {
        let message = ChannelMessage::new(7, NEW_YEAR_2024 + 3_661, "Hello world")
            .with_entities(vec![Entity::bold(0, 5)])
            .with_stats(Some(120), Some(4))
            .with_reactions(vec![Reaction {
                symbol: "🔥".to_string(),
                count: 9,
            }]);

        let record = FeedRecord::from_message(&message, &Tz::UTC);

        assert_eq!(record.id, 7);
        assert_eq!(record.date, "2024-01-01 01:01:01");
        assert_eq!(record.updated_at, record.date);
        assert_eq!(record.title, "01-01");
        assert_eq!(record.message, "**Hello** world");
        assert_eq!(record.views, Some(120));
        assert_eq!(record.reply_count, Some(4));
        assert_eq!(record.year, 2024);
    }

    #[test]
    fn test_zero_replies_become_null() {
        let message = ChannelMessage::new(1, NEW_YEAR_2024, "hi").with_stats(None, Some(0));
        let record = FeedRecord::from_message(&message, &Tz::UTC);
        assert_eq!(record.reply_count, None);
    }

    #[test]
    fn test_timezone_moves_year_boundary() {
        let message = ChannelMessage::new(1, NEW_YEAR_2024 - 1, "late");

        let utc = FeedRecord::from_message(&message, &Tz::UTC);
        assert_eq!(utc.date, "2023-12-31 23:59:59");
        assert_eq!(utc.year, 2023);

        let shanghai = FeedRecord::from_message(&message, &Tz::Asia__Shanghai);
        assert_eq!(shanghai.date, "2024-01-01 07:59:59");
        assert_eq!(shanghai.title, "01-01");
        assert_eq!(shanghai.year, 2024);
    }

    #[test]
    fn test_serialized_shape() {
        let message = ChannelMessage::new(3, NEW_YEAR_2024, "Hello").with_entities(vec![]);
        let value = serde_json::to_value(FeedRecord::from_message(&message, &Tz::UTC)).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 3,
                "date": "2024-01-01 00:00:00",
                "updatedAt": "2024-01-01 00:00:00",
                "message": "Hello",
                "views": null,
                "replyCount": null,
                "reactions": [],
                "title": "01-01",
                "entities": []
            })
        );
    }

    #[test]
    fn test_group_by_year() {
        let records = [
            ChannelMessage::new(5, NEW_YEAR_2024 + 10, "newest"),
            ChannelMessage::new(4, NEW_YEAR_2024 + 5, ""),
            ChannelMessage::new(3, NEW_YEAR_2024 + 1, "new year"),
            ChannelMessage::new(2, NEW_YEAR_2024 - 10, "last year"),
        ]
        .iter()
        .map(|message| FeedRecord::from_message(message, &Tz::UTC))
        .collect::<Vec<_>>();

        let groups = group_by_year(records);

        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["2023", "2024"]);
        let ids: Vec<i32> = groups["2024"].iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 3]);
        assert_eq!(groups["2023"][0].message, "last year");
    }
}

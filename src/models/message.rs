use serde::{Deserialize, Serialize};
use teloxide::types::{
    Message, MessageEntity, MessageEntityKind, MessageKind, ReactionCount, ReactionType,
};

/// Formatting annotation over a UTF-16 range of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub offset: usize,
    pub length: usize,
    #[serde(flatten)]
    pub kind: EntityKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityKind {
    Bold,
    Underline,
    Strikethrough,
    TextUrl { url: String },
    Url,
    Blockquote,
    Pre { language: String },
    Code,
}

impl EntityKind {
    pub fn is_link(&self) -> bool {
        matches!(self, EntityKind::Url | EntityKind::TextUrl { .. })
    }
}

impl Entity {
    pub fn new(kind: EntityKind, offset: usize, length: usize) -> Self {
        Self {
            offset,
            length,
            kind,
        }
    }

    pub fn bold(offset: usize, length: usize) -> Self {
        Self::new(EntityKind::Bold, offset, length)
    }

    pub fn code(offset: usize, length: usize) -> Self {
        Self::new(EntityKind::Code, offset, length)
    }

    pub fn url(offset: usize, length: usize) -> Self {
        Self::new(EntityKind::Url, offset, length)
    }

    pub fn text_url(offset: usize, length: usize, url: impl Into<String>) -> Self {
        Self::new(EntityKind::TextUrl { url: url.into() }, offset, length)
    }

    pub fn pre(offset: usize, length: usize, language: impl Into<String>) -> Self {
        Self::new(
            EntityKind::Pre {
                language: language.into(),
            },
            offset,
            length,
        )
    }

    /// Converts a Bot API entity, returning `None` for kinds the feed does not render.
    pub fn from_telegram(entity: &MessageEntity) -> Option<Self> {
        let kind = match &entity.kind {
            MessageEntityKind::Bold => EntityKind::Bold,
            MessageEntityKind::Underline => EntityKind::Underline,
            MessageEntityKind::Strikethrough => EntityKind::Strikethrough,
            MessageEntityKind::TextLink { url } => EntityKind::TextUrl {
                url: url.to_string(),
            },
            MessageEntityKind::Url => EntityKind::Url,
            MessageEntityKind::Blockquote => EntityKind::Blockquote,
            MessageEntityKind::Pre { language } => EntityKind::Pre {
                language: language.clone().unwrap_or_default(),
            },
            MessageEntityKind::Code => EntityKind::Code,
            _ => return None,
        };

        Some(Self::new(kind, entity.offset, entity.length))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    #[serde(rename = "reaction")]
    pub symbol: String,
    pub count: u32,
}

impl Reaction {
    /// Converts a Bot API reaction count. Custom and paid reactions have no
    /// emoji to show and yield `None`.
    pub fn from_telegram(reaction: &ReactionCount) -> Option<Self> {
        match &reaction.r#type {
            ReactionType::Emoji { emoji } => Some(Self {
                symbol: emoji.clone(),
                count: u32::try_from(reaction.total_count).unwrap_or(u32::MAX),
            }),
            _ => None,
        }
    }
}

/// A user-authored channel post as seen by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub id: i32,
    /// Unix timestamp, seconds.
    pub date: i64,
    pub text: String,
    pub entities: Option<Vec<Entity>>,
    #[serde(default)]
    pub views: Option<u32>,
    #[serde(default)]
    pub reply_count: Option<u32>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

impl ChannelMessage {
    pub fn new(id: i32, date: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            date,
            text: text.into(),
            entities: None,
            views: None,
            reply_count: None,
            reactions: Vec::new(),
        }
    }

    pub fn with_entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = Some(entities);
        self
    }

    pub fn with_stats(mut self, views: Option<u32>, reply_count: Option<u32>) -> Self {
        self.views = views;
        self.reply_count = reply_count;
        self
    }

    pub fn with_reactions(mut self, reactions: Vec<Reaction>) -> Self {
        self.reactions = reactions;
        self
    }

    /// Converts a channel post. Service messages yield `None`; media posts
    /// contribute their caption.
    pub fn from_telegram(msg: &Message) -> Option<Self> {
        if !matches!(msg.kind, MessageKind::Common(_)) {
            return None;
        }

        let (text, entities) = match (msg.text(), msg.caption()) {
            (Some(text), _) => (text, msg.entities()),
            (None, Some(caption)) => (caption, msg.caption_entities()),
            (None, None) => ("", None),
        };

        let entities = entities.filter(|e| !e.is_empty()).map(|entities| {
            entities
                .iter()
                .filter_map(Entity::from_telegram)
                .collect::<Vec<_>>()
        });

        let mut message = Self::new(msg.id.0, msg.date.timestamp(), text);
        message.entities = entities;
        Some(message)
    }
}

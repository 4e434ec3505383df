pub mod feed;
pub mod message;

pub use feed::{FeedRecord, YearGroups};
pub use message::{ChannelMessage, Entity, EntityKind, Reaction};

pub mod channel_store;
pub mod feed;
pub mod validation;

pub use channel_store::{ChannelStore, MessageSource};
pub use feed::FeedService;
pub use validation::ChannelValidator;

pub mod channel_post;
pub mod feed;

pub use channel_post::{channel_post_handler, reaction_count_handler, ChannelPostHandler};
pub use feed::{router, AppState, FeedQuery};

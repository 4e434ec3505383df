use std::sync::Arc;
use teloxide::{dispatching::Dispatcher, prelude::*, types::MessageReactionCountUpdated};
use tracing::{error, info};

use channel_feed::{
    channel_post_handler, create_bot, create_handlers, create_services, init_logging,
    reaction_count_handler, router, AppConfig, ChannelPostHandler, FeedError,
};

fn create_dispatcher(
    bot: Bot,
    post_handler: Arc<ChannelPostHandler>,
) -> Dispatcher<Bot, teloxide::RequestError, teloxide::dispatching::DefaultKey> {
    let handler = dptree::entry()
        .branch(Update::filter_channel_post().endpoint({
            let post_handler = Arc::clone(&post_handler);
            move |msg: Message| {
                let handler = Arc::clone(&post_handler);
                async move {
                    if let Err(e) = channel_post_handler(msg, handler).await {
                        error!("Error in channel post handler: {:?}", e);
                    }
                    Ok(())
                }
            }
        }))
        .branch(Update::filter_edited_channel_post().endpoint({
            let post_handler = Arc::clone(&post_handler);
            move |msg: Message| {
                let handler = Arc::clone(&post_handler);
                async move {
                    if let Err(e) = channel_post_handler(msg, handler).await {
                        error!("Error in edited channel post handler: {:?}", e);
                    }
                    Ok(())
                }
            }
        }))
        .branch(Update::filter_message_reaction_count_updated().endpoint({
            let post_handler = Arc::clone(&post_handler);
            move |update: MessageReactionCountUpdated| {
                let handler = Arc::clone(&post_handler);
                async move {
                    if let Err(e) = reaction_count_handler(update, handler).await {
                        error!("Error in reaction count handler: {:?}", e);
                    }
                    Ok(())
                }
            }
        }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
}

#[tokio::main]
async fn main() -> Result<(), FeedError> {
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;

    init_logging(&config.logging)?;

    info!("Starting Channel Feed v{}", env!("CARGO_PKG_VERSION"));

    if config.channels.allowed.is_empty() {
        tracing::warn!("ALLOWED_CHANNELS is empty, every feed request will be rejected");
    }

    let (store, feed) = create_services(&config);
    let (post_handler, state) = create_handlers(&config, store, feed);

    let listener = tokio::net::TcpListener::bind(config.server.address()).await?;
    info!("🌐 Feed endpoint listening on {}", config.server.address());

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router(state)).await {
            error!("HTTP server stopped: {:?}", e);
        }
    });

    let bot = create_bot(&config.telegram)?;

    let mut dispatcher = create_dispatcher(bot, Arc::new(post_handler));

    dispatcher.dispatch().await;

    server.abort();

    Ok(())
}

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::errors::{FeedError, FeedResult, INVALID_CHANNEL_MESSAGE};
use crate::models::YearGroups;
use crate::services::{ChannelValidator, FeedService};

#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<FeedService>,
    pub validator: Arc<ChannelValidator>,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub channel: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/tg", get(channel_feed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /api/tg?channel=<id>
///
/// Year-grouped Markdown rendering of the channel's buffered posts.
pub async fn channel_feed(
    State(state): State<AppState>,
    query: Result<Query<FeedQuery>, QueryRejection>,
) -> FeedResult<Json<YearGroups>> {
    let Query(query) = query.map_err(|e| {
        warn!("Rejected malformed feed query: {}", e);
        FeedError::invalid_channel(INVALID_CHANNEL_MESSAGE)
    })?;

    let channel = state
        .validator
        .validate(query.channel.as_deref())
        .map_err(|e| {
            warn!("Rejected feed request for {:?}: {}", query.channel, e);
            e
        })?;

    match state.feed.channel_feed(channel).await {
        Ok(groups) => Ok(Json(groups)),
        Err(e) => {
            error!("Failed to build feed for {}: {:?}", channel.0, e);
            Err(e)
        }
    }
}

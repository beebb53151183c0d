use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::models::{collect_playlist_items, PlaylistItem};

/// Batch of playlist items to add
#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaylistItemsRequest {
    /// Raw item objects; malformed ones are skipped
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<Value>,
}

/// Result of a batch item submission
#[derive(Debug, Serialize, ToSchema)]
pub struct PlaylistItemsResponse {
    pub accepted: usize,
    pub skipped: usize,
    pub items: Vec<PlaylistItem>,
}

/// Add items to a playlist
///
/// Items that fail to parse are dropped and counted in `skipped`; the
/// request still succeeds with the remaining items.
#[utoipa::path(
    post,
    path = "/api/playlists/items",
    request_body = PlaylistItemsRequest,
    responses(
        (status = 200, description = "Items accepted", body = PlaylistItemsResponse),
    ),
    tag = "Playlists"
)]
pub async fn handle_add_items(
    Json(request): Json<PlaylistItemsRequest>,
) -> Json<PlaylistItemsResponse> {
    let items = collect_playlist_items(&request.items);
    let skipped = request.items.len() - items.len();

    tracing::info!(accepted = items.len(), skipped, "Playlist items received");

    Json(PlaylistItemsResponse {
        accepted: items.len(),
        skipped,
        items,
    })
}

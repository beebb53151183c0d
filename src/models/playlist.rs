use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// One entry of a device playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlaylistItem {
    pub screen_id: String,
    #[serde(default = "default_duration")]
    pub duration_secs: u32,
    #[serde(default)]
    pub position: u32,
}

fn default_duration() -> u32 {
    300
}

/// Parse a batch of playlist items, skipping malformed entries.
///
/// A bad entry does not fail the batch: it is logged and dropped, and the
/// remaining items keep their relative order.
pub fn collect_playlist_items(raw: &[Value]) -> Vec<PlaylistItem> {
    raw.iter()
        .enumerate()
        .filter_map(|(index, value)| {
            match serde_json::from_value::<PlaylistItem>(value.clone()) {
                Ok(item) if !item.screen_id.trim().is_empty() => Some(item),
                Ok(_) => {
                    tracing::warn!(index, "Skipping playlist item with empty screen_id");
                    None
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping malformed playlist item");
                    None
                }
            }
        })
        .collect()
}

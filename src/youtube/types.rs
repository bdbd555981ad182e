use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Envelope shared by the `search`, `videos` and `playlists` endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub items: Vec<Resource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub kind: String,
    pub id: ResourceId,
    pub snippet: Snippet,
    #[serde(rename = "contentDetails")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_details: Option<ContentDetails>,
}

/// `videos`/`playlists` return a bare id, `search` wraps it with its kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Plain(String),
    Search(SearchId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchId {
    pub kind: String,
    #[serde(rename = "videoId")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(rename = "playlistId")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub title: String,
    #[serde(rename = "channelTitle")]
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub thumbnails: HashMap<String, Thumbnail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentDetails {
    #[serde(rename = "itemCount")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<u64>,
}

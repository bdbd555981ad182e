use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SoundcloudObject {
    Track(Track),
    Playlist(PlaylistObject),
    /// Users and anything else that cannot be played
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub collection: Vec<SoundcloudObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsResponse {
    pub collection: Vec<ChartItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub track: Track,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: u64,
    pub title: String,
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,
    /// Milliseconds
    pub duration: u64,
    pub permalink_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistObject {
    pub id: u64,
    pub title: String,
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_count: Option<u64>,
    pub permalink_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

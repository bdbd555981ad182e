use crate::error::{BrowseError, Result};
use serde::{Deserialize, Serialize};
pub use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Supported backends
#[derive(
    EnumIter,
    Display,
    EnumString,
    AsRefStr,
    Debug,
    Clone,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    Copy,
)]
#[strum(ascii_case_insensitive)]
pub enum Platform {
    YouTube,
    Spotify,
    SoundCloud,
}

impl Platform {
    /// Default pattern used by the browser to route a url to this backend
    pub fn url_pattern(&self) -> &'static str {
        match self {
            Platform::YouTube => r"youtube\.com|youtu\.be",
            Platform::Spotify => r"spotify\.com",
            Platform::SoundCloud => r"soundcloud\.com",
        }
    }

    pub fn icon_url(&self) -> &'static str {
        match self {
            Platform::YouTube => "https://www.youtube.com/favicon.ico",
            Platform::Spotify => "https://open.spotify.com/favicon.ico",
            Platform::SoundCloud => "https://soundcloud.com/favicon.ico",
        }
    }
}

#[derive(Display, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ItemKind {
    Entry,
    Playlist,
}

/// A single playable track or video
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub title: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub url: String,
    pub platform: Platform,
}

impl Entry {
    /// Create a new entry, rejecting an empty url
    pub fn new(title: String, artist: String, url: String, platform: Platform) -> Result<Self> {
        Ok(Self {
            title,
            artist,
            image: None,
            duration: None,
            url: require_url(url, platform)?,
            platform,
        })
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    pub fn with_duration(mut self, duration: Option<f64>) -> Self {
        self.duration = duration;
        self
    }
}

/// An ordered collection whose members are not fetched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Playlist {
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_count: Option<u64>,
    pub url: String,
    pub platform: Platform,
}

impl Playlist {
    /// Create a new playlist, rejecting an empty url
    pub fn new(title: String, author: String, url: String, platform: Platform) -> Result<Self> {
        Ok(Self {
            title,
            author,
            image: None,
            entry_count: None,
            url: require_url(url, platform)?,
            platform,
        })
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    pub fn with_entry_count(mut self, entry_count: Option<u64>) -> Self {
        self.entry_count = entry_count;
        self
    }
}

fn require_url(url: String, platform: Platform) -> Result<String> {
    if url.trim().is_empty() {
        return Err(BrowseError::InvalidResponse(format!(
            "{platform} item without url"
        )));
    }
    Ok(url)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlayableItem {
    Entry(Entry),
    Playlist(Playlist),
}

impl PlayableItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            PlayableItem::Entry(_) => ItemKind::Entry,
            PlayableItem::Playlist(_) => ItemKind::Playlist,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            PlayableItem::Entry(e) => &e.url,
            PlayableItem::Playlist(p) => &p.url,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            PlayableItem::Entry(e) => &e.title,
            PlayableItem::Playlist(p) => &p.title,
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            PlayableItem::Entry(e) => e.platform,
            PlayableItem::Playlist(p) => p.platform,
        }
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            PlayableItem::Entry(e) => e.image.as_deref(),
            PlayableItem::Playlist(p) => p.image.as_deref(),
        }
    }

    /// Hand this item to the host's playback channel
    pub fn play(&self, sink: &dyn PlaybackSink, mode: PlayMode) {
        sink.play(self.url(), mode);
    }
}

impl From<Entry> for PlayableItem {
    fn from(entry: Entry) -> Self {
        PlayableItem::Entry(entry)
    }
}

impl From<Playlist> for PlayableItem {
    fn from(playlist: Playlist) -> Self {
        PlayableItem::Playlist(playlist)
    }
}

#[derive(
    EnumIter, Display, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayMode {
    #[default]
    Now,
    Next,
    Queue,
}

/// Host-provided command channel receiving play requests
pub trait PlaybackSink: Send + Sync {
    fn play(&self, url: &str, mode: PlayMode);
}

/// Trait implemented by every backend
#[async_trait::async_trait]
pub trait Searcher: Send + Sync {
    /// Get platform identifier
    fn platform(&self) -> Platform;

    /// Query the backend; results keep the backend's order
    async fn search(&self, query: &str) -> Result<Vec<PlayableItem>>;

    /// Look up the single item a backend url points at
    async fn resolve_url(&self, url: &str) -> Result<PlayableItem>;

    /// Backend-curated items, no caller input
    async fn featured(&self) -> Result<Vec<PlayableItem>>;
}

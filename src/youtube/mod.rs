use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::config::YoutubeConfig;
use crate::core::{Entry, Platform, PlayableItem, Playlist, Searcher};
use crate::error::{BrowseError, Result};
use crate::transport::Transport;
use crate::utils::parse_json;

pub mod types;
pub mod utils;

use types::{ListResponse, Resource, ResourceId};
pub use utils::{YoutubeTarget, parse_target};
use utils::{build_playlist_url, build_watch_url, fallback_image, pick_thumbnail};

/// YouTube's official "Music" channel
pub const FEATURED_CHANNEL_ID: &str = "UC-9-kyTW8ZkZNDHQJ6FgpwQ";

/// Freebase topic id for music
const MUSIC_TOPIC_ID: &str = "%2Fm%2F04rlf";

/// YouTube Data API v3 searcher
pub struct YoutubeSearcher {
    transport: Arc<dyn Transport>,
    api_key: Option<String>,
    api_base: String,
}

impl YoutubeSearcher {
    pub fn new(transport: Arc<dyn Transport>, config: &YoutubeConfig) -> Self {
        Self {
            transport,
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(BrowseError::MissingCredential("youtube.api_key"))
    }

    pub fn search_url(&self, query: &str) -> Result<String> {
        Ok(format!(
            "{}/search?part=snippet&maxResults=20&q={}&topicId={}&type=video%2Cplaylist&key={}",
            self.api_base,
            urlencoding::encode(query),
            MUSIC_TOPIC_ID,
            self.api_key()?
        ))
    }

    pub fn lookup_url(&self, target: &YoutubeTarget) -> Result<String> {
        let key = self.api_key()?;
        Ok(match target {
            YoutubeTarget::Video(id) => format!(
                "{}/videos?part=snippet&id={}&key={}",
                self.api_base, id, key
            ),
            YoutubeTarget::Playlist(id) => format!(
                "{}/playlists?part=snippet%2CcontentDetails&id={}&key={}",
                self.api_base, id, key
            ),
        })
    }

    pub fn featured_url(&self) -> Result<String> {
        Ok(format!(
            "{}/playlists?part=snippet%2CcontentDetails&channelId={}&maxResults=20&key={}",
            self.api_base,
            FEATURED_CHANNEL_ID,
            self.api_key()?
        ))
    }

    async fn fetch_list(&self, url: &str) -> Result<Vec<Resource>> {
        let body = self.transport.get(url, &[]).await?;
        let response: ListResponse = parse_json(&body)?;
        Ok(response.items)
    }
}

/// Map one API resource onto an entry or playlist
pub fn build_item(resource: Resource) -> Result<PlayableItem> {
    let Resource {
        kind,
        id,
        snippet,
        content_details,
    } = resource;

    let (kind, id) = match id {
        ResourceId::Plain(id) => (kind, Some(id)),
        ResourceId::Search(search) => (search.kind, search.video_id.or(search.playlist_id)),
    };
    let id = id.ok_or_else(|| BrowseError::InvalidResponse(format!("{kind} without id")))?;

    let image = pick_thumbnail(&snippet.thumbnails)
        .map(str::to_string)
        .unwrap_or_else(|| fallback_image(&snippet.title));

    match kind.as_str() {
        "youtube#video" => Ok(Entry::new(
            snippet.title,
            snippet.channel_title,
            build_watch_url(&id),
            Platform::YouTube,
        )?
        .with_image(Some(image))
        .into()),
        "youtube#playlist" => Ok(Playlist::new(
            snippet.title,
            snippet.channel_title,
            build_playlist_url(&id),
            Platform::YouTube,
        )?
        .with_image(Some(image))
        .with_entry_count(content_details.and_then(|c| c.item_count))
        .into()),
        _ => Err(BrowseError::UnsupportedKind(kind)),
    }
}

#[async_trait]
impl Searcher for YoutubeSearcher {
    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    async fn search(&self, query: &str) -> Result<Vec<PlayableItem>> {
        let items = self.fetch_list(&self.search_url(query)?).await?;
        debug!(count = items.len(), "youtube search results");
        items.into_iter().map(build_item).collect()
    }

    async fn resolve_url(&self, url: &str) -> Result<PlayableItem> {
        let target = parse_target(url)?;
        let items = self.fetch_list(&self.lookup_url(&target)?).await?;
        let first = items
            .into_iter()
            .next()
            .ok_or_else(|| BrowseError::ItemNotFound(url.to_string()))?;
        build_item(first)
    }

    async fn featured(&self) -> Result<Vec<PlayableItem>> {
        let items = self.fetch_list(&self.featured_url()?).await?;
        items.into_iter().map(build_item).collect()
    }
}

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::config::SoundcloudConfig;
use crate::core::{Entry, Platform, PlayableItem, Playlist, Searcher};
use crate::error::{BrowseError, Result};
use crate::transport::Transport;
use crate::utils::parse_json;

pub mod types;

use types::{ChartsResponse, PlaylistObject, SearchResponse, SoundcloudObject, Track};

const ALL_MUSIC_GENRE: &str = "soundcloud%3Agenres%3Aall-music";

/// SoundCloud API v2 searcher.
///
/// Urls are never parsed here: the resolve endpoint (or a proxy standing in
/// for it) maps any permalink to its object.
pub struct SoundcloudSearcher {
    transport: Arc<dyn Transport>,
    client_id: Option<String>,
    api_base: String,
}

impl SoundcloudSearcher {
    pub fn new(transport: Arc<dyn Transport>, config: &SoundcloudConfig) -> Self {
        Self {
            transport,
            client_id: config.client_id.clone().filter(|id| !id.is_empty()),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path_and_query: &str) -> String {
        match &self.client_id {
            Some(id) => format!("{}/{}&client_id={}", self.api_base, path_and_query, id),
            None => format!("{}/{}", self.api_base, path_and_query),
        }
    }

    pub fn search_url(&self, query: &str) -> String {
        self.endpoint(&format!("search?q={}&limit=20", urlencoding::encode(query)))
    }

    pub fn resolve_request_url(&self, url: &str) -> String {
        self.endpoint(&format!("resolve?url={}", urlencoding::encode(url)))
    }

    pub fn featured_url(&self) -> String {
        self.endpoint(&format!(
            "charts?kind=trending&genre={}&limit=20",
            ALL_MUSIC_GENRE
        ))
    }
}

fn build_track(track: Track) -> Result<PlayableItem> {
    let image = track.artwork_url.or(track.user.avatar_url);
    Ok(Entry::new(
        track.title,
        track.user.username,
        track.permalink_url,
        Platform::SoundCloud,
    )?
    .with_image(image)
    .with_duration(Some(track.duration as f64 / 1000.0))
    .into())
}

fn build_playlist(playlist: PlaylistObject) -> Result<PlayableItem> {
    let image = playlist.artwork_url.or(playlist.user.avatar_url);
    Ok(Playlist::new(
        playlist.title,
        playlist.user.username,
        playlist.permalink_url,
        Platform::SoundCloud,
    )?
    .with_image(image)
    .with_entry_count(playlist.track_count)
    .into())
}

/// `None` for objects that cannot be played
pub fn build_item(object: SoundcloudObject) -> Option<Result<PlayableItem>> {
    match object {
        SoundcloudObject::Track(track) => Some(build_track(track)),
        SoundcloudObject::Playlist(playlist) => Some(build_playlist(playlist)),
        SoundcloudObject::Other => None,
    }
}

fn is_http_url(url: &str) -> bool {
    Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

#[async_trait]
impl Searcher for SoundcloudSearcher {
    fn platform(&self) -> Platform {
        Platform::SoundCloud
    }

    async fn search(&self, query: &str) -> Result<Vec<PlayableItem>> {
        let body = self.transport.get(&self.search_url(query), &[]).await?;
        let response: SearchResponse = parse_json(&body)?;
        let total = response.collection.len();
        let items = response
            .collection
            .into_iter()
            .filter_map(build_item)
            .collect::<Result<Vec<_>>>()?;
        if items.len() < total {
            debug!(
                skipped = total - items.len(),
                "skipped non-playable soundcloud results"
            );
        }
        Ok(items)
    }

    async fn resolve_url(&self, url: &str) -> Result<PlayableItem> {
        if !is_http_url(url) {
            return Err(BrowseError::UnrecognizedUrl(url.to_string()));
        }
        let body = self
            .transport
            .get(&self.resolve_request_url(url), &[])
            .await?;
        let value: Value = parse_json(&body)?;
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let object: SoundcloudObject = serde_json::from_value(value)?;
        build_item(object).unwrap_or_else(|| Err(BrowseError::UnsupportedKind(kind)))
    }

    async fn featured(&self) -> Result<Vec<PlayableItem>> {
        let body = self.transport.get(&self.featured_url(), &[]).await?;
        let response: ChartsResponse = parse_json(&body)?;
        response
            .collection
            .into_iter()
            .map(|item| build_track(item.track))
            .collect()
    }
}

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::error::{BrowseError, Result};
use crate::youtube::types::Thumbnail;

/// Thumbnail keys in order of preference. `medium` is the only true 16:9
/// rendition, the 4:3 ones are letterboxed.
pub const THUMBNAIL_PREFERENCE: [&str; 5] = ["maxres", "medium", "standard", "high", "default"];

static TARGET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:watch|playlist)\?(v|list)=([A-Za-z0-9\-_]{8,})").expect("valid regex")
});

static SHORT_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"youtu\.be/([A-Za-z0-9\-_]{8,})").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YoutubeTarget {
    Video(String),
    Playlist(String),
}

/// Work out which video or playlist a YouTube url points at
pub fn parse_target(url: &str) -> Result<YoutubeTarget> {
    if let Some(caps) = TARGET_RE.captures(url) {
        let id = caps[2].to_string();
        return Ok(match &caps[1] {
            "v" => YoutubeTarget::Video(id),
            _ => YoutubeTarget::Playlist(id),
        });
    }

    if let Some(caps) = SHORT_LINK_RE.captures(url) {
        return Ok(YoutubeTarget::Video(caps[1].to_string()));
    }

    Err(BrowseError::UnrecognizedUrl(url.to_string()))
}

/// Construct YouTube watch URL from video ID
pub fn build_watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Construct YouTube playlist URL from playlist ID
pub fn build_playlist_url(playlist_id: &str) -> String {
    format!("https://www.youtube.com/playlist?list={}", playlist_id)
}

pub fn pick_thumbnail(thumbnails: &HashMap<String, Thumbnail>) -> Option<&str> {
    THUMBNAIL_PREFERENCE
        .iter()
        .find_map(|key| thumbnails.get(*key))
        .map(|t| t.url.as_str())
}

/// Keep only letters and whitespace
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .collect()
}

/// Stock photo keyed by the title, for items without thumbnails
pub fn fallback_image(title: &str) -> String {
    format!(
        "https://source.unsplash.com/featured/?{}",
        urlencoding::encode(sanitize_title(title).trim())
    )
}

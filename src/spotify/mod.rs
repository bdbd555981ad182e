use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

use crate::config::SpotifyConfig;
use crate::core::{Entry, Platform, PlayableItem, Playlist, Searcher};
use crate::error::{BrowseError, Result};
use crate::transport::Transport;
use crate::utils::parse_json;

pub mod token;
pub mod types;

pub use token::{AccessToken, TokenCache};
use types::{FeaturedResponse, Paging, PlaylistObject, SearchResponse, SpotifyObject, Track};

static TARGET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[/:])(track|playlist)[/:]([A-Za-z0-9]{18,})").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpotifyTarget {
    Track(String),
    Playlist(String),
}

/// Extract the track or playlist id from an open.spotify.com url or a
/// `spotify:` uri. Legacy `user/<id>/playlist/<id>` links work as well.
/// Query strings and fragments are ignored.
pub fn parse_target(url: &str) -> Result<SpotifyTarget> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let caps = TARGET_RE
        .captures(path)
        .ok_or_else(|| BrowseError::UnrecognizedUrl(url.to_string()))?;
    let id = caps[2].to_string();
    Ok(match &caps[1] {
        "track" => SpotifyTarget::Track(id),
        _ => SpotifyTarget::Playlist(id),
    })
}

/// Spotify Web API searcher
pub struct SpotifySearcher {
    transport: Arc<dyn Transport>,
    tokens: Arc<TokenCache>,
    api_base: String,
}

impl SpotifySearcher {
    pub fn new(transport: Arc<dyn Transport>, config: &SpotifyConfig) -> Self {
        let tokens = Arc::new(TokenCache::new(transport.clone(), config.token_url.clone()));
        Self::with_token_cache(transport, tokens, config)
    }

    pub fn with_token_cache(
        transport: Arc<dyn Transport>,
        tokens: Arc<TokenCache>,
        config: &SpotifyConfig,
    ) -> Self {
        Self {
            transport,
            tokens,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn token_cache(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let header = self.tokens.auth_header().await?;
        let body = self.transport.get(url, &[header]).await?;
        parse_json(&body)
    }
}

fn external_url(urls: &types::ExternalUrls, kind: &str, id: &str) -> String {
    urls.spotify
        .clone()
        .unwrap_or_else(|| format!("https://open.spotify.com/{kind}/{id}"))
}

fn build_track(track: Track) -> Result<PlayableItem> {
    let url = external_url(&track.external_urls, "track", &track.id);
    let artist = track
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let image = track
        .album
        .and_then(|album| album.images.into_iter().next())
        .map(|img| img.url);

    Ok(Entry::new(track.name, artist, url, Platform::Spotify)?
        .with_image(image)
        .with_duration(Some(track.duration_ms as f64 / 1000.0))
        .into())
}

fn build_playlist(playlist: PlaylistObject) -> Result<PlayableItem> {
    let url = external_url(&playlist.external_urls, "playlist", &playlist.id);
    let author = playlist
        .owner
        .display_name
        .unwrap_or(playlist.owner.id);
    let image = playlist
        .images
        .and_then(|images| images.into_iter().next())
        .map(|img| img.url);

    Ok(Playlist::new(playlist.name, author, url, Platform::Spotify)?
        .with_image(image)
        .with_entry_count(playlist.tracks.map(|t| t.total))
        .into())
}

pub fn build_item(object: SpotifyObject) -> Result<PlayableItem> {
    match object {
        SpotifyObject::Track(track) => build_track(track),
        SpotifyObject::Playlist(playlist) => build_playlist(playlist),
    }
}

/// The API pads paging arrays with `null` for unavailable objects
fn build_page(page: Option<Paging<SpotifyObject>>) -> Result<Vec<PlayableItem>> {
    let Some(page) = page else {
        return Ok(Vec::new());
    };
    let total = page.items.len();
    let items = page
        .items
        .into_iter()
        .flatten()
        .map(build_item)
        .collect::<Result<Vec<_>>>()?;
    if items.len() < total {
        debug!(skipped = total - items.len(), "skipped null spotify items");
    }
    Ok(items)
}

#[async_trait]
impl Searcher for SpotifySearcher {
    fn platform(&self) -> Platform {
        Platform::Spotify
    }

    /// Tracks first, then playlists, each in response order
    async fn search(&self, query: &str) -> Result<Vec<PlayableItem>> {
        let url = format!(
            "{}/search?q={}&type=track%2Cplaylist&limit=20",
            self.api_base,
            urlencoding::encode(query)
        );
        let response: SearchResponse = self.get_json(&url).await?;
        let mut items = build_page(response.tracks)?;
        items.extend(build_page(response.playlists)?);
        Ok(items)
    }

    async fn resolve_url(&self, url: &str) -> Result<PlayableItem> {
        let lookup = match parse_target(url)? {
            SpotifyTarget::Track(id) => format!("{}/tracks/{}", self.api_base, id),
            SpotifyTarget::Playlist(id) => format!("{}/playlists/{}", self.api_base, id),
        };
        let object: SpotifyObject = self.get_json(&lookup).await?;
        build_item(object)
    }

    async fn featured(&self) -> Result<Vec<PlayableItem>> {
        let url = format!("{}/browse/featured-playlists?limit=20", self.api_base);
        let response: FeaturedResponse = self.get_json(&url).await?;
        build_page(Some(response.playlists))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ItemKind;
    use crate::transport::testing::MockTransport;
    use chrono::Utc;

    const TOKEN_URL: &str = "https://tokens.example/spotify";

    fn track_json(id: &str, name: &str, duration_ms: u64) -> String {
        format!(
            r#"{{"type":"track","id":"{id}","name":"{name}","duration_ms":{duration_ms},
                "artists":[{{"name":"A"}},{{"name":"B"}}],
                "album":{{"name":"Album","images":[
                    {{"url":"https://i.scdn.co/image/big","width":640}},
                    {{"url":"https://i.scdn.co/image/small","width":64}}]}},
                "external_urls":{{"spotify":"https://open.spotify.com/track/{id}"}}}}"#
        )
    }

    fn playlist_json(id: &str, name: &str) -> String {
        format!(
            r#"{{"type":"playlist","id":"{id}","name":"{name}",
                "owner":{{"id":"spotify","display_name":"Spotify"}},
                "images":[{{"url":"https://i.scdn.co/image/pl"}}],
                "tracks":{{"total":75}},
                "external_urls":{{"spotify":"https://open.spotify.com/playlist/{id}"}}}}"#
        )
    }

    /// Searcher with a fresh cached token, so only API calls hit the transport
    fn searcher(transport: MockTransport) -> SpotifySearcher {
        let transport: Arc<dyn Transport> = Arc::new(transport);
        let tokens = TokenCache::new(transport.clone(), TOKEN_URL).with_token(AccessToken {
            access_token: "tok".to_string(),
            expires_at: Utc::now().timestamp() + 3600,
        });
        SpotifySearcher::with_token_cache(transport, Arc::new(tokens), &SpotifyConfig::default())
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(
            parse_target("https://open.spotify.com/track/4cOdK2wGLETKBW3PvgPWqT").unwrap(),
            SpotifyTarget::Track("4cOdK2wGLETKBW3PvgPWqT".to_string())
        );
        assert_eq!(
            parse_target("https://open.spotify.com/user/spotify/playlist/37i9dQZF1DXcBWIGoYBM5M")
                .unwrap(),
            SpotifyTarget::Playlist("37i9dQZF1DXcBWIGoYBM5M".to_string())
        );
        assert_eq!(
            parse_target("spotify:track:4cOdK2wGLETKBW3PvgPWqT").unwrap(),
            SpotifyTarget::Track("4cOdK2wGLETKBW3PvgPWqT".to_string())
        );
        assert!(matches!(
            parse_target("https://open.spotify.com/artist/0OdUWJ0sBjDrqHygGUXeCF"),
            Err(BrowseError::UnrecognizedUrl(_))
        ));
        assert!(parse_target("https://open.spotify.com/track/short").is_err());
        assert_eq!(
            parse_target("https://open.spotify.com/track/4cOdK2wGLETKBW3PvgPWqT?si=abc").unwrap(),
            SpotifyTarget::Track("4cOdK2wGLETKBW3PvgPWqT".to_string())
        );
    }

    #[test]
    fn test_parse_target_ignores_query_context() {
        assert!(matches!(
            parse_target(
                "https://open.spotify.com/album/4aawyAB9vmqN3uQ7FjRGTy\
                 ?context=spotify:playlist:37i9dQZF1DXcBWIGoYBM5M"
            ),
            Err(BrowseError::UnrecognizedUrl(_))
        ));
        assert!(matches!(
            parse_target("https://open.spotify.com/soundtrack/37i9dQZF1DXcBWIGoYBM5M"),
            Err(BrowseError::UnrecognizedUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_search_sends_bearer_and_keeps_order() {
        let body = format!(
            r#"{{"tracks":{{"items":[{},{}]}},"playlists":{{"items":[null,{}]}}}}"#,
            track_json("111111111111111111111a", "First", 212000),
            track_json("222222222222222222222b", "Second", 1234),
            playlist_json("333333333333333333333c", "Mix"),
        );
        let mut transport = MockTransport::new();
        transport
            .expect_fetch()
            .withf(|_, url, headers| {
                url == "https://api.spotify.com/v1/search\
                        ?q=daft%20punk&type=track%2Cplaylist&limit=20"
                    && headers
                        == [("Authorization".to_string(), "Bearer tok".to_string())].as_slice()
            })
            .times(1)
            .returning(move |_, _, _| Ok(body.clone()));

        let items = searcher(transport).search("daft punk").await.unwrap();
        let titles: Vec<_> = items.iter().map(|i| i.title()).collect();
        assert_eq!(titles, ["First", "Second", "Mix"]);

        let PlayableItem::Entry(first) = &items[0] else {
            panic!("expected entry");
        };
        assert_eq!(first.artist, "A, B");
        assert_eq!(first.duration, Some(212.0));
        assert_eq!(first.image.as_deref(), Some("https://i.scdn.co/image/big"));

        let PlayableItem::Entry(second) = &items[1] else {
            panic!("expected entry");
        };
        assert_eq!(second.duration, Some(1.234));

        let PlayableItem::Playlist(mix) = &items[2] else {
            panic!("expected playlist");
        };
        assert_eq!(mix.author, "Spotify");
        assert_eq!(mix.entry_count, Some(75));
        assert_eq!(mix.url, "https://open.spotify.com/playlist/333333333333333333333c");
    }

    #[tokio::test]
    async fn test_resolve_track() {
        let body = track_json("4cOdK2wGLETKBW3PvgPWqT", "Song", 180500);
        let mut transport = MockTransport::new();
        transport
            .expect_fetch()
            .withf(|_, url, _| url == "https://api.spotify.com/v1/tracks/4cOdK2wGLETKBW3PvgPWqT")
            .times(1)
            .returning(move |_, _, _| Ok(body.clone()));

        let item = searcher(transport)
            .resolve_url("https://open.spotify.com/track/4cOdK2wGLETKBW3PvgPWqT?si=abc")
            .await
            .unwrap();
        let PlayableItem::Entry(entry) = item else {
            panic!("expected entry");
        };
        assert_eq!(entry.duration, Some(180.5));
        assert_eq!(entry.platform, Platform::Spotify);
    }

    #[tokio::test]
    async fn test_resolve_legacy_playlist() {
        let body = playlist_json("37i9dQZF1DXcBWIGoYBM5M", "Today's Top Hits");
        let mut transport = MockTransport::new();
        transport
            .expect_fetch()
            .withf(|_, url, _| url == "https://api.spotify.com/v1/playlists/37i9dQZF1DXcBWIGoYBM5M")
            .times(1)
            .returning(move |_, _, _| Ok(body.clone()));

        let item = searcher(transport)
            .resolve_url("https://open.spotify.com/user/spotify/playlist/37i9dQZF1DXcBWIGoYBM5M")
            .await
            .unwrap();
        assert_eq!(item.kind(), ItemKind::Playlist);
        assert_eq!(item.title(), "Today's Top Hits");
    }

    #[tokio::test]
    async fn test_featured_maps_playlist_items() {
        let body = format!(
            r#"{{"message":"Monday morning music","playlists":{{"items":[{},{}]}}}}"#,
            playlist_json("444444444444444444444d", "One"),
            playlist_json("555555555555555555555e", "Two"),
        );
        let mut transport = MockTransport::new();
        transport
            .expect_fetch()
            .withf(|_, url, _| url.ends_with("/browse/featured-playlists?limit=20"))
            .times(1)
            .returning(move |_, _, _| Ok(body.clone()));

        let items = searcher(transport).featured().await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.kind() == ItemKind::Playlist));
    }

    #[tokio::test]
    async fn test_token_fetched_before_first_call() {
        let mut transport = MockTransport::new();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_fetch()
            .withf(|_, url, headers| url == TOKEN_URL && headers.is_empty())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(r#"{"access_token":"new","expires_in":3600}"#.to_string()));
        transport
            .expect_fetch()
            .withf(|_, url, headers| {
                url != TOKEN_URL && headers.first().is_some_and(|h| h.1 == "Bearer new")
            })
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(r#"{"playlists":{"items":[]}}"#.to_string()));

        let config = SpotifyConfig {
            token_url: TOKEN_URL.to_string(),
            ..SpotifyConfig::default()
        };
        let searcher = SpotifySearcher::new(Arc::new(transport), &config);
        assert!(searcher.featured().await.unwrap().is_empty());
        assert!(searcher.featured().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_type_is_parse_error() {
        let mut transport = MockTransport::new();
        transport.expect_fetch().returning(|_, _, _| {
            Ok(r#"{"type":"episode","id":"x","name":"Podcast"}"#.to_string())
        });
        let err = searcher(transport)
            .resolve_url("https://open.spotify.com/track/4cOdK2wGLETKBW3PvgPWqT")
            .await
            .unwrap_err();
        assert!(matches!(err, BrowseError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_api_error_surfaces_message() {
        let mut transport = MockTransport::new();
        transport.expect_fetch().returning(|_, _, _| {
            Ok(r#"{"error":{"status":401,"message":"The access token expired"}}"#.to_string())
        });
        let err = searcher(transport).search("x").await.unwrap_err();
        assert!(matches!(err, BrowseError::InvalidResponse(m) if m == "The access token expired"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_fetch()
            .times(1)
            .returning(|_, _, _| Ok("<html><body>Bad Gateway</body></html>".to_string()));
        let err = searcher(transport).search("x").await.unwrap_err();
        assert!(matches!(err, BrowseError::ParseError(_)));
    }
}

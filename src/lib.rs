pub mod browser;
pub mod config;
pub mod core;
pub mod error;
pub mod soundcloud;
pub mod spotify;
pub mod transport;
mod utils;
pub mod youtube;

pub use browser::{BackendSelector, Browser, Registration};
pub use config::{Config, load_config};
pub use core::{
    Entry, ItemKind, Platform, PlayMode, PlayableItem, PlaybackSink, Playlist, Searcher,
};
pub use error::{BrowseError, Result};
pub use soundcloud::SoundcloudSearcher;
pub use spotify::{SpotifySearcher, TokenCache};
pub use transport::{HttpMethod, HttpTransport, Transport};
pub use youtube::YoutubeSearcher;

use std::sync::Arc;

/// Build the standard browser from the user's config over a real HTTP client
pub fn browser_from_env() -> Result<Browser> {
    let config = load_config()?;
    let transport = Arc::new(HttpTransport::new(&config.http)?);
    Browser::from_config(&config, transport)
}

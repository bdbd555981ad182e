use regex::Regex;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::core::{Platform, PlayableItem, Searcher};
use crate::error::{BrowseError, Result};
use crate::soundcloud::SoundcloudSearcher;
use crate::spotify::SpotifySearcher;
use crate::transport::Transport;
use crate::youtube::YoutubeSearcher;

/// One backend known to the browser
pub struct Registration {
    pub name: String,
    pub platform: Platform,
    pub adapter: Arc<dyn Searcher>,
    pub icon_url: String,
    pub url_pattern: Regex,
}

impl Registration {
    pub fn new(
        name: impl Into<String>,
        adapter: Arc<dyn Searcher>,
        icon_url: impl Into<String>,
        url_pattern: &str,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            platform: adapter.platform(),
            adapter,
            icon_url: icon_url.into(),
            url_pattern: Regex::new(url_pattern)?,
        })
    }

    /// Register an adapter under its platform's name, icon and url pattern
    pub fn for_adapter(adapter: Arc<dyn Searcher>) -> Result<Self> {
        let platform = adapter.platform();
        Self::new(
            platform.to_string(),
            adapter,
            platform.icon_url(),
            platform.url_pattern(),
        )
    }

    pub fn matches(&self, url: &str) -> bool {
        self.url_pattern.is_match(url)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("platform", &self.platform)
            .field("icon_url", &self.icon_url)
            .field("url_pattern", &self.url_pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Ways of naming the backend to switch to
#[derive(Clone, Copy)]
pub enum BackendSelector<'a> {
    Name(&'a str),
    Platform(Platform),
    Adapter(&'a Arc<dyn Searcher>),
}

impl<'a> From<&'a str> for BackendSelector<'a> {
    fn from(name: &'a str) -> Self {
        BackendSelector::Name(name)
    }
}

impl From<Platform> for BackendSelector<'_> {
    fn from(platform: Platform) -> Self {
        BackendSelector::Platform(platform)
    }
}

impl<'a> From<&'a Arc<dyn Searcher>> for BackendSelector<'a> {
    fn from(adapter: &'a Arc<dyn Searcher>) -> Self {
        BackendSelector::Adapter(adapter)
    }
}

impl fmt::Display for BackendSelector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendSelector::Name(name) => write!(f, "{name}"),
            BackendSelector::Platform(platform) => write!(f, "{platform}"),
            BackendSelector::Adapter(adapter) => write!(f, "{} adapter", adapter.platform()),
        }
    }
}

/// Routes calls to the active backend, or to the backend a url belongs to
#[derive(Debug)]
pub struct Browser {
    registry: Vec<Registration>,
    active: usize,
}

impl Browser {
    pub fn new<'a>(
        registry: Vec<Registration>,
        active: impl Into<BackendSelector<'a>>,
    ) -> Result<Self> {
        let selector = active.into();
        let active = position(&registry, selector)
            .ok_or_else(|| BrowseError::UnknownBackend(selector.to_string()))?;
        Ok(Self { registry, active })
    }

    /// The standard YouTube, Spotify, SoundCloud registry
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Result<Self> {
        let adapters: [Arc<dyn Searcher>; 3] = [
            Arc::new(YoutubeSearcher::new(transport.clone(), &config.youtube)),
            Arc::new(SpotifySearcher::new(transport.clone(), &config.spotify)),
            Arc::new(SoundcloudSearcher::new(transport, &config.soundcloud)),
        ];
        let registry = adapters
            .into_iter()
            .map(Registration::for_adapter)
            .collect::<Result<Vec<_>>>()?;
        Self::new(registry, config.browser.default_backend)
    }

    pub fn active(&self) -> &Registration {
        &self.registry[self.active]
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registry
    }

    /// First registration, in order, whose pattern matches the url
    pub fn recognize(&self, url: &str) -> Option<&Registration> {
        self.registry.iter().find(|r| r.matches(url))
    }

    /// Make another backend active. The selection is unchanged on error.
    pub fn switch_backend<'a>(
        &mut self,
        selector: impl Into<BackendSelector<'a>>,
    ) -> Result<&Registration> {
        let selector = selector.into();
        let index = position(&self.registry, selector)
            .ok_or_else(|| BrowseError::UnknownBackend(selector.to_string()))?;
        self.active = index;
        debug!(backend = %self.registry[index].name, "switched backend");
        Ok(&self.registry[index])
    }

    pub async fn search(&self, query: &str) -> Result<Vec<PlayableItem>> {
        self.active().adapter.search(query).await
    }

    pub async fn featured(&self) -> Result<Vec<PlayableItem>> {
        self.active().adapter.featured().await
    }

    /// Unmatched urls still go to the active backend
    pub async fn resolve_url(&self, url: &str) -> Result<PlayableItem> {
        let target = match self.recognize(url) {
            Some(registration) => registration,
            None => {
                debug!(
                    url,
                    backend = %self.active().name,
                    "no pattern matched, using active backend"
                );
                self.active()
            }
        };
        target.adapter.resolve_url(url).await
    }
}

fn position(registry: &[Registration], selector: BackendSelector<'_>) -> Option<usize> {
    registry.iter().position(|r| match selector {
        BackendSelector::Name(name) => r.name.eq_ignore_ascii_case(name),
        BackendSelector::Platform(platform) => r.platform == platform,
        BackendSelector::Adapter(adapter) => Arc::ptr_eq(&r.adapter, adapter),
    })
}

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::Platform;
use crate::error::{BrowseError, Result};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

const ENV_YOUTUBE_API_KEY: &str = "MUSICBROWSE_YOUTUBE_API_KEY";
const ENV_SOUNDCLOUD_CLIENT_ID: &str = "MUSICBROWSE_SOUNDCLOUD_CLIENT_ID";
const ENV_SPOTIFY_TOKEN_URL: &str = "MUSICBROWSE_SPOTIFY_TOKEN_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub youtube: YoutubeConfig,
    #[serde(default)]
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub soundcloud: SoundcloudConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Backend selected when the browser starts
    pub default_backend: Platform,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            default_backend: Platform::Spotify,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 600,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    pub api_key: Option<String>,
    pub api_base: String,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://www.googleapis.com/youtube/v3".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    /// Endpoint handing out pre-authorized bearer tokens
    pub token_url: String,
    pub api_base: String,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            token_url: "http://utils.giesela.org/tokens/spotify".to_string(),
            api_base: "https://api.spotify.com/v1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundcloudConfig {
    pub client_id: Option<String>,
    pub api_base: String,
}

impl Default for SoundcloudConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            api_base: "https://api-v2.soundcloud.com".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BrowseError::ConfigParseError(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| BrowseError::ConfigParseError(e.to_string()))
    }

    /// Override file values with `MUSICBROWSE_*` environment variables
    pub fn apply_env(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(key) = non_empty(ENV_YOUTUBE_API_KEY) {
            self.youtube.api_key = Some(key);
        }
        if let Some(id) = non_empty(ENV_SOUNDCLOUD_CLIENT_ID) {
            self.soundcloud.client_id = Some(id);
        }
        if let Some(url) = non_empty(ENV_SPOTIFY_TOKEN_URL) {
            self.spotify.token_url = url;
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("musicbrowse").join("config.toml"))
}

/// Load the config file if it exists, then apply environment overrides
pub fn load_config() -> Result<Config> {
    let config = match config_path() {
        Some(path) if path.exists() => {
            debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)?;
            Config::from_toml_str(&content)?
        }
        _ => Config::default(),
    };
    Ok(config.apply_env())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.browser.default_backend, Platform::Spotify);
        assert_eq!(config.http.timeout_secs, 600);
        assert!(config.youtube.api_key.is_none());
        assert_eq!(config.soundcloud.api_base, "https://api-v2.soundcloud.com");
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
            [browser]
            default_backend = "YouTube"

            [youtube]
            api_key = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.browser.default_backend, Platform::YouTube);
        assert_eq!(config.youtube.api_key.as_deref(), Some("abc"));
        assert_eq!(
            config.youtube.api_base,
            "https://www.googleapis.com/youtube/v3"
        );
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("[browser\n").unwrap_err();
        assert!(matches!(err, BrowseError::ConfigParseError(_)));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_YOUTUBE_API_KEY, "from-env"),
            (ENV_SOUNDCLOUD_CLIENT_ID, ""),
        ]);
        let mut config = Config::default();
        config.soundcloud.client_id = Some("file".to_string());
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.youtube.api_key.as_deref(), Some("from-env"));
        // empty values do not clobber the file
        assert_eq!(config.soundcloud.client_id.as_deref(), Some("file"));
    }

    #[test]
    fn test_toml_roundtrip_keeps_backend() {
        let mut config = Config::default();
        config.browser.default_backend = Platform::SoundCloud;
        let text = config.to_toml_string().unwrap();
        let parsed = Config::from_toml_str(&text).unwrap();
        assert_eq!(parsed.browser.default_backend, Platform::SoundCloud);
    }
}

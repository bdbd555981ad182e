//! Bearer token cache for the Spotify Web API.
//!
//! The token service hands out pre-authorized tokens without any input. The
//! cache keeps one token and refreshes it once it has expired. The slot lock
//! is held across the refresh, so callers that observe expiry at the same time
//! wait for a single refresh instead of racing their own.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{BrowseError, Result};
use crate::transport::Transport;
use crate::utils::parse_json;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    /// Expiry as unix epoch seconds
    pub expires_at: i64,
}

impl AccessToken {
    pub fn is_fresh(&self, now: i64) -> bool {
        self.expires_at > now
    }

    pub fn header(&self) -> (String, String) {
        (
            "Authorization".to_string(),
            format!("Bearer {}", self.access_token),
        )
    }
}

/// Token services answer with either an absolute or a relative expiry
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_at: Option<f64>,
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_token(self, now: i64) -> Result<AccessToken> {
        let expires_at = match (self.expires_at, self.expires_in) {
            (Some(at), _) => at as i64,
            (None, Some(secs)) => now.checked_add(secs).ok_or_else(|| {
                BrowseError::InvalidResponse(format!("token expiry out of range: {secs}"))
            })?,
            (None, None) => {
                return Err(BrowseError::InvalidResponse(
                    "token response without expiry".to_string(),
                ));
            }
        };
        Ok(AccessToken {
            access_token: self.access_token,
            expires_at,
        })
    }
}

pub struct TokenCache {
    transport: Arc<dyn Transport>,
    token_url: String,
    slot: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    pub fn new(transport: Arc<dyn Transport>, token_url: impl Into<String>) -> Self {
        Self {
            transport,
            token_url: token_url.into(),
            slot: Mutex::new(None),
        }
    }

    /// Seed the cache, e.g. with a token persisted by the host
    pub fn with_token(self, token: AccessToken) -> Self {
        Self {
            slot: Mutex::new(Some(token)),
            ..self
        }
    }

    pub async fn current(&self) -> Option<AccessToken> {
        self.slot.lock().await.clone()
    }

    /// `Authorization` header for the cached token, refreshing it if expired
    pub async fn auth_header(&self) -> Result<(String, String)> {
        let mut slot = self.slot.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = slot.as_ref().filter(|t| t.is_fresh(now)) {
            debug!(expires_at = token.expires_at, "spotify token cache hit");
            return Ok(token.header());
        }

        info!("getting new spotify token");
        let body = self.transport.get(&self.token_url, &[]).await?;
        let token = parse_json::<TokenResponse>(&body)?.into_token(now)?;
        let header = token.header();
        *slot = Some(token);
        Ok(header)
    }
}

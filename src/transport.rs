use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::error::{BrowseError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// Raw HTTP access used by every searcher.
///
/// Resolves with the response body for any completed exchange, whatever the
/// status code. Only failures to complete the exchange are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<String>;

    async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<String> {
        self.fetch(HttpMethod::Get, url, headers).await
    }

    async fn post(&self, url: &str, headers: &[(String, String)]) -> Result<String> {
        self.fetch(HttpMethod::Post, url, headers).await
    }
}

/// `Transport` backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| BrowseError::ConfigParseError(format!("user_agent: {e}")))?;
        headers.insert(USER_AGENT, agent);

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<String> {
        let mut request = self.client.request(method.into(), url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        debug!(?method, url = %redact(url), "sending request");
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BrowseError::RequestTimeout(redact(url))
            } else {
                BrowseError::NetworkError(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), url = %redact(url), "non-success response");
        }
        Ok(response.text().await?)
    }
}

/// Hide credential query parameters before a url reaches logs or errors
pub(crate) fn redact(url: &str) -> String {
    const SECRETS: [&str; 2] = ["key", "client_id"];
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let query = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if SECRETS.contains(&name) => format!("{name}=***"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{base}?{query}")
}

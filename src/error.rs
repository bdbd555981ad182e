use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowseError {
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Request timeout for URL: {0}")]
    RequestTimeout(String),

    #[error("Unrecognized URL: {0}")]
    UnrecognizedUrl(String),

    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Unsupported item kind: {0}")]
    UnsupportedKind(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Config parse error: {0}")]
    ConfigParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, BrowseError>;

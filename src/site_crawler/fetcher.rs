// src/site_crawler/fetcher.rs
use reqwest::Client;
use std::fmt;
use tracing::debug;

/// Why a page fetch failed. The crawl loop handles every variant the same
/// way (log and skip the page), the variant just keeps logs diagnosable.
#[derive(Debug)]
pub enum FetchError {
    Timeout,
    Connect(String),
    Status(reqwest::StatusCode),
    Transport(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Timeout => write!(f, "request timed out"),
            FetchError::Connect(e) => write!(f, "connection failed: {}", e),
            FetchError::Status(code) => write!(f, "HTTP error: {}", code),
            FetchError::Transport(e) => write!(f, "transport error: {}", e),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Fetch one page body. Single attempt, no retries: a failed page is
/// skipped by the caller and the crawl moves on to the next URL.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    debug!("Fetching: {}", url);

    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let body = response.text().await?;
    debug!("Fetched {} bytes from {}", body.len(), url);

    Ok(body)
}

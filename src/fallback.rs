use crate::errors::FetchError;
use crate::models::StaticPayload;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// Static data file consulted when the embedded store has nothing to offer.
#[async_trait]
pub trait FallbackSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<u8>, FetchError>;

    fn describe(&self) -> String;
}

/// Reads the resource from `<static_dir>/<relative_path>`.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(static_dir: impl Into<PathBuf>, relative_path: &str) -> Self {
        Self {
            path: static_dir.into().join(relative_path.trim_start_matches("./")),
        }
    }
}

#[async_trait]
impl FallbackSource for FileSource {
    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        Ok(fs::read(&self.path).await?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fetches the resource over HTTP relative to a base URL. No timeout is set:
/// a hung request stalls only the cycle waiting on it.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(base_url: &str, relative_path: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                relative_path.trim_start_matches("./").trim_start_matches('/')
            ),
        }
    }
}

#[async_trait]
impl FallbackSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

pub fn parse_payload(bytes: &[u8]) -> Result<StaticPayload, FetchError> {
    Ok(serde_json::from_slice(bytes)?)
}

impl StaticPayload {
    /// Whether the payload carries anything worth rendering.
    pub fn is_usable(&self) -> bool {
        !self.orders.is_empty() || self.analytics.as_ref().is_some_and(|a| !a.is_empty())
    }
}

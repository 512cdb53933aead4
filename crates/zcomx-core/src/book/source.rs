use std::path::PathBuf;

use reqwest::Client;
use url::Url;

use super::PageList;
use crate::{Error, Result};

/// Where the page list of a book comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    File(PathBuf),
    Url(Url),
}

impl PageSource {
    /// Interpret `http(s)://` locations as URLs, anything else as a file path
    pub fn parse(location: &str) -> Result<Self> {
        if location.starts_with("http://") || location.starts_with("https://") {
            Ok(Self::Url(Url::parse(location)?))
        } else if location.is_empty() {
            Err(Error::PageSource("empty page source".to_string()))
        } else {
            Ok(Self::File(PathBuf::from(location)))
        }
    }

    /// Fetch and parse the page list
    pub async fn load(&self, client: &Client) -> Result<PageList> {
        match self {
            Self::File(path) => {
                tracing::debug!("Reading page list from {}", path.display());
                let content = tokio::fs::read_to_string(path).await?;
                PageList::from_json(&content)
            }
            Self::Url(url) => {
                tracing::debug!("Fetching page list from {}", url);
                let response = client
                    .get(url.clone())
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(Error::PageSource(format!("HTTP {} for URL: {}", status, url)));
                }
                let body = response.text().await?;
                PageList::from_json(&body)
            }
        }
    }
}

impl std::fmt::Display for PageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{}", url),
        }
    }
}

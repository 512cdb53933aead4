use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use url::Url;

use crate::book::ImageSize;
use crate::config::LoaderConfig;
use crate::{Error, Result};

/// Source of page image bytes
#[async_trait::async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Bytes>;
}

/// `{base}/images/download/{image_id}?size={web|print}`
pub fn image_url(base: &Url, image_id: &str, size: ImageSize) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::Config(format!("Base URL cannot hold a path: {}", base)))?
        .pop_if_empty()
        .extend(["images", "download", image_id]);
    url.set_query(None);
    url.query_pairs_mut().append_pair("size", size.as_str());
    Ok(url)
}

/// Image fetcher backed by reqwest
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("image/avif,image/webp,image/*,*/*;q=0.8"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .gzip(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }

    /// Shared client, also used for the page list request
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait::async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &Url) -> Result<Bytes> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::ImageFetch(format!("HTTP {} for URL: {}", status, url)));
        }
        Ok(response.bytes().await?)
    }
}

//! Manifest retrieval. The polling engine only sees [`ManifestFetcher`].

use std::sync::OnceLock;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::config::FetchConfig;
use crate::error::MonitorError;

/// Fetches manifest text. Non-success statuses are errors.
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, MonitorError>;
}

pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// Create a reqwest Client with the provided configuration
pub fn create_client(config: &FetchConfig) -> Result<Client, MonitorError> {
    install_rustls_provider();

    let mut client_builder = Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(config.headers.clone())
        .redirect(if config.follow_redirects {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::none()
        });

    if !config.timeout.is_zero() {
        client_builder = client_builder.timeout(config.timeout);
    }

    if !config.connect_timeout.is_zero() {
        client_builder = client_builder.connect_timeout(config.connect_timeout);
    }

    client_builder.build().map_err(MonitorError::from)
}

/// [`ManifestFetcher`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, MonitorError> {
        Ok(Self {
            client: create_client(config)?,
        })
    }
}

#[async_trait]
impl ManifestFetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url), level = "debug")]
    async fn fetch(&self, url: &Url) -> Result<String, MonitorError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::http_status(status, url.as_str()));
        }
        let body = response.text().await?;
        debug!(bytes = body.len(), "fetched manifest");
        Ok(body)
    }
}

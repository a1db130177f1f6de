// HTTP client for the campaign service

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::campaign::{Campaign, CampaignEnvelope, CampaignListEnvelope};
use crate::config::ClientConfig;
use crate::error::{ConfigError, FetchError, FetchResult};

const CAMPAIGNS_PATH: &str = "api/gmaps/campaigns";

/// Thin wrapper over `reqwest` that maps every failure to [`FetchError`]
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Self::with_http(&config.api_url, http)
    }

    /// Use a preconfigured `reqwest` client
    pub fn with_http(base_url: &str, http: reqwest::Client) -> Result<Self, ConfigError> {
        // Trailing slash so that joins append instead of replacing the last segment
        let mut normalized = base_url.trim_end_matches('/').to_string();
        normalized.push('/');
        Ok(Self {
            base_url: Url::parse(&normalized)?,
            http,
        })
    }

    /// Client with only a timeout, for quick setups and tests
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        Self::new(&ClientConfig::new(base_url).with_request_timeout(timeout))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET api/gmaps/campaigns/{id}`
    pub async fn get_campaign(&self, campaign_id: &str) -> FetchResult<Campaign> {
        let url = self.campaign_url(campaign_id)?;
        let envelope: CampaignEnvelope = self.get_url(url).await?;
        Ok(envelope.into_inner())
    }

    /// `GET api/gmaps/campaigns`
    pub async fn list_campaigns(&self) -> FetchResult<Vec<Campaign>> {
        let envelope: CampaignListEnvelope = self.get(CAMPAIGNS_PATH).await?;
        Ok(envelope.campaigns)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> FetchResult<T> {
        let url = self.join(path)?;
        self.get_url(url).await
    }

    /// The id is one opaque path segment, percent-encoded as a whole
    fn campaign_url(&self, campaign_id: &str) -> FetchResult<Url> {
        // Dot segments would be dropped and resolve to the collection itself
        if matches!(campaign_id, "." | "..") {
            return Err(FetchError::NotFound);
        }
        let mut url = self.join(CAMPAIGNS_PATH)?;
        url.path_segments_mut()
            .map_err(|_| {
                FetchError::decode(format!("base url {} cannot take a path", self.base_url))
            })?
            .push(campaign_id);
        Ok(url)
    }

    fn join(&self, path: &str) -> FetchResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| FetchError::decode(format!("invalid path {path}: {e}")))
    }

    async fn get_url<T: DeserializeOwned>(&self, url: Url) -> FetchResult<T> {
        debug!(%url, "GET");
        let response = self.http.get(url).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> FetchResult<T> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::decode(e.to_string()))
    }
}

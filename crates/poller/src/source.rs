// Fetch seam between the scheduler and the transport

use async_trait::async_trait;
use tracing::instrument;

use crate::campaign::Campaign;
use crate::client::HttpClient;
use crate::error::FetchResult;

/// Something that can produce a fresh snapshot on demand
///
/// Implementations must not retry internally; every failure is reported
/// to the scheduler as-is.
#[async_trait]
pub trait StatusSource<T>: Send + Sync {
    async fn fetch(&self) -> FetchResult<T>;

    /// Human-readable label used in logs
    fn describe(&self) -> String;
}

/// Status of a single campaign
pub struct CampaignStatusSource {
    client: HttpClient,
    campaign_id: String,
}

impl CampaignStatusSource {
    pub fn new(client: HttpClient, campaign_id: impl Into<String>) -> Self {
        Self {
            client,
            campaign_id: campaign_id.into(),
        }
    }

    pub fn campaign_id(&self) -> &str {
        &self.campaign_id
    }
}

#[async_trait]
impl StatusSource<Campaign> for CampaignStatusSource {
    #[instrument(skip(self), fields(campaign_id = %self.campaign_id))]
    async fn fetch(&self) -> FetchResult<Campaign> {
        self.client.get_campaign(&self.campaign_id).await
    }

    fn describe(&self) -> String {
        format!("campaign {}", self.campaign_id)
    }
}

/// The full campaign collection
pub struct CampaignListSource {
    client: HttpClient,
}

impl CampaignListSource {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusSource<Vec<Campaign>> for CampaignListSource {
    #[instrument(skip(self))]
    async fn fetch(&self) -> FetchResult<Vec<Campaign>> {
        self.client.list_campaigns().await
    }

    fn describe(&self) -> String {
        "campaign list".to_string()
    }
}

// Campaign snapshots as reported by the campaign service
//
// The poller only reads these; every field is owned by the backend.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::policy::PollableEntity;

/// Lifecycle state of a campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Pending,
    Running,
    Paused,
    Completed,
    Failed,
    /// Any status string this client does not know about
    #[serde(other)]
    Unknown,
}

impl CampaignStatus {
    /// Terminal states never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, CampaignStatus::Completed | CampaignStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Pending => "pending",
            CampaignStatus::Running => "running",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
            CampaignStatus::Failed => "failed",
            CampaignStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point-in-time view of one campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub status: CampaignStatus,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    /// Backend estimate of when the campaign will finish
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub estimated_completion: Option<DateTime<Utc>>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub total_businesses_found: Option<u64>,
    #[serde(default)]
    pub total_emails_found: Option<u64>,
    #[serde(default)]
    pub total_facebook_pages_found: Option<u64>,
    #[serde(default)]
    pub total_linkedin_profiles_found: Option<u64>,
    #[serde(default)]
    pub actual_cost: Option<f64>,
}

impl Campaign {
    /// Minimal snapshot, mostly useful for tests and fixtures
    pub fn new(id: impl Into<String>, status: CampaignStatus) -> Self {
        Self {
            id: id.into(),
            name: None,
            status,
            started_at: None,
            completed_at: None,
            estimated_completion: None,
            progress: None,
            total_businesses_found: None,
            total_emails_found: None,
            total_facebook_pages_found: None,
            total_linkedin_profiles_found: None,
            actual_cost: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_estimated_completion(mut self, at: DateTime<Utc>) -> Self {
        self.estimated_completion = Some(at);
        self
    }
}

impl PollableEntity for Campaign {
    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    fn is_running(&self) -> bool {
        self.status == CampaignStatus::Running
    }

    fn estimated_completion(&self) -> Option<DateTime<Utc>> {
        // Only meaningful while the campaign is still going
        if self.status.is_terminal() {
            None
        } else {
            self.estimated_completion
        }
    }
}

/// Single-campaign response; the service sometimes wraps the object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CampaignEnvelope {
    Wrapped { campaign: Campaign },
    Bare(Campaign),
}

impl CampaignEnvelope {
    pub(crate) fn into_inner(self) -> Campaign {
        match self {
            CampaignEnvelope::Wrapped { campaign } => campaign,
            CampaignEnvelope::Bare(campaign) => campaign,
        }
    }
}

/// Collection response
#[derive(Debug, Deserialize)]
pub(crate) struct CampaignListEnvelope {
    #[serde(default)]
    pub campaigns: Vec<Campaign>,
}

/// Accepts RFC 3339 or an offset-less ISO-8601 timestamp (read as UTC).
/// Empty or unparseable values become `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

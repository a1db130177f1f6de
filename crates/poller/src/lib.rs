//! # Campaign status polling
//!
//! Keeps a local view of lead-generation campaigns fresh by polling the
//! campaign service, fetching more often as a campaign nears completion and
//! stopping once it reaches a terminal state.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │    StatusSource<T>   │      │    PollPolicy<T>     │
//! │ (HTTP fetch, timeout)│      │ AdaptiveCadence /    │
//! │                      │      │ AnyRunning           │
//! └──────────┬───────────┘      └──────────┬───────────┘
//!            │                             │
//!            ▼                             ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                     Poller<T>                        │
//! │  fetch → decide → arm-or-stop, gated on Visibility,  │
//! │  failures handled by ErrorPolicy                     │
//! └─────────────────────────────────────────────────────┘
//!            │
//!            ▼
//!   PollerHandle<T> (events, latest snapshot, refetch, cancel on drop)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use leadgen_poller::prelude::*;
//!
//! let config = WatchConfig::from_env()?;
//! let client = HttpClient::new(&config.client)?;
//! let mut handle = watch_campaign(client, Some("c-42"), &config);
//!
//! while let Some(event) = handle.next_event().await {
//!     match event {
//!         PollEvent::Fetched(campaign) => println!("{}", campaign.status),
//!         PollEvent::Failed(err) => eprintln!("{err}"),
//!         PollEvent::Stopped(_) => break,
//!     }
//! }
//! ```

pub mod campaign;
pub mod client;
pub mod config;
pub mod error;
pub mod policy;
pub mod retry;
pub mod scheduler;
pub mod source;
pub mod visibility;

/// Prelude for common imports
pub mod prelude {
    pub use crate::campaign::{Campaign, CampaignStatus};
    pub use crate::client::HttpClient;
    pub use crate::config::{ClientConfig, WatchConfig};
    pub use crate::error::{ConfigError, FetchError, FetchResult};
    pub use crate::policy::{AdaptiveCadence, AnyRunning, NextPoll, PollPolicy, PollableEntity};
    pub use crate::retry::{ErrorPolicy, RetryPolicy};
    pub use crate::scheduler::{PollEvent, Poller, PollerHandle, PollerState, StopReason};
    pub use crate::source::{CampaignListSource, CampaignStatusSource, StatusSource};
    pub use crate::visibility::{Visibility, VisibilityController};
    pub use crate::{
        watch_campaign, watch_campaign_with_visibility, watch_campaigns,
        watch_campaigns_with_visibility,
    };
}

// Re-export key types at crate root
pub use campaign::{Campaign, CampaignStatus};
pub use client::HttpClient;
pub use config::{ClientConfig, WatchConfig};
pub use error::{ConfigError, FetchError, FetchResult};
pub use policy::{AdaptiveCadence, AnyRunning, NextPoll, PollPolicy, PollableEntity};
pub use retry::{ErrorPolicy, RetryPolicy};
pub use scheduler::{PollEvent, Poller, PollerHandle, PollerState, StopReason};
pub use source::{CampaignListSource, CampaignStatusSource, StatusSource};
pub use visibility::{Visibility, VisibilityController};

/// Start a status poller for one campaign. Without an id the poller is
/// disabled and never fetches.
pub fn watch_campaign(
    client: HttpClient,
    campaign_id: Option<&str>,
    config: &WatchConfig,
) -> PollerHandle<Campaign> {
    watch_campaign_with_visibility(client, campaign_id, config, Visibility::always())
}

/// Like [`watch_campaign`], gated on the consumer's interest signal
pub fn watch_campaign_with_visibility(
    client: HttpClient,
    campaign_id: Option<&str>,
    config: &WatchConfig,
    visibility: Visibility,
) -> PollerHandle<Campaign> {
    match campaign_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => Poller::new(CampaignStatusSource::new(client, id), config.cadence.clone())
            .with_visibility(visibility)
            .with_error_policy(config.error_policy.clone())
            .spawn(),
        None => Poller::disabled(),
    }
}

/// Start a poller over the whole campaign collection
pub fn watch_campaigns(client: HttpClient, config: &WatchConfig) -> PollerHandle<Vec<Campaign>> {
    watch_campaigns_with_visibility(client, config, Visibility::always())
}

/// Like [`watch_campaigns`], gated on the consumer's interest signal
pub fn watch_campaigns_with_visibility(
    client: HttpClient,
    config: &WatchConfig,
    visibility: Visibility,
) -> PollerHandle<Vec<Campaign>> {
    Poller::new(CampaignListSource::new(client), config.list.clone())
        .with_visibility(visibility)
        .with_error_policy(config.error_policy.clone())
        .spawn()
}

// Campaign commands: one-shot reads and live watches

use crate::output::{format_progress, print_field, print_table_header, print_table_row, OutputFormat};
use anyhow::{Context, Result};
use clap::Subcommand;
use leadgen_poller::prelude::*;
use serde::Serialize;

#[derive(Subcommand)]
pub enum CampaignsCommand {
    /// List all campaigns
    List,

    /// Show one campaign
    Get {
        /// Campaign ID
        id: String,
    },

    /// Follow one campaign until it completes or fails
    Watch {
        /// Campaign ID
        id: String,
    },

    /// Follow all campaigns while any of them is running
    WatchAll,
}

/// Line emitted per cycle in json/yaml watch output
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum WatchRecord<'a, T: Serialize> {
    Snapshot { data: &'a T },
    Error { kind: &'static str, message: String },
    Stopped { reason: &'static str },
}

pub async fn run(
    command: CampaignsCommand,
    client: HttpClient,
    config: &WatchConfig,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    match command {
        CampaignsCommand::List => list(&client, output).await,
        CampaignsCommand::Get { id } => get(&client, output, &id).await,
        CampaignsCommand::Watch { id } => watch(client, config, output, quiet, &id).await,
        CampaignsCommand::WatchAll => watch_all(client, config, output, quiet).await,
    }
}

async fn list(client: &HttpClient, output: OutputFormat) -> Result<()> {
    let campaigns = client
        .list_campaigns()
        .await
        .context("Failed to fetch campaigns")?;

    if output.is_text() {
        print_campaign_table(&campaigns);
    } else {
        output.print_value(&serde_json::json!({ "campaigns": campaigns, "total": campaigns.len() }))?;
    }

    Ok(())
}

async fn get(client: &HttpClient, output: OutputFormat, id: &str) -> Result<()> {
    let campaign = client.get_campaign(id).await.map_err(|e| match e {
        FetchError::NotFound => anyhow::anyhow!("Campaign not found: {}", id),
        e => anyhow::Error::new(e).context("Failed to fetch campaign status"),
    })?;

    if output.is_text() {
        print_campaign(&campaign);
    } else {
        output.print_value(&campaign)?;
    }

    Ok(())
}

async fn watch(
    client: HttpClient,
    config: &WatchConfig,
    output: OutputFormat,
    quiet: bool,
    id: &str,
) -> Result<()> {
    let mut handle = watch_campaign(client, Some(id), config);
    let mut last_status: Option<CampaignStatus> = None;

    loop {
        let event = tokio::select! {
            event = handle.next_event() => event,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received interrupt, stopping watch");
                handle.cancel();
                continue;
            }
        };

        let Some(event) = event else {
            break;
        };

        match event {
            PollEvent::Fetched(campaign) => {
                if output.is_text() {
                    if quiet {
                        if last_status != Some(campaign.status) {
                            println!("{}", campaign.status);
                        }
                    } else {
                        print_watch_line(&campaign);
                    }
                } else {
                    output.print_value(&WatchRecord::Snapshot { data: &campaign })?;
                }
                last_status = Some(campaign.status);
            }
            PollEvent::Failed(err) => report_failure(output, &err, &config.error_policy)?,
            PollEvent::Stopped(reason) => {
                if !output.is_text() {
                    output.print_value(&WatchRecord::Stopped::<()> {
                        reason: reason_label(reason),
                    })?;
                }
                return finish_watch(reason, last_status, id);
            }
        }
    }

    Ok(())
}

async fn watch_all(
    client: HttpClient,
    config: &WatchConfig,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let mut handle = watch_campaigns(client, config);

    loop {
        let event = tokio::select! {
            event = handle.next_event() => event,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received interrupt, stopping watch");
                handle.cancel();
                continue;
            }
        };

        let Some(event) = event else {
            break;
        };

        match event {
            PollEvent::Fetched(campaigns) => {
                let running: Vec<&Campaign> = campaigns
                    .iter()
                    .filter(|c| c.status == CampaignStatus::Running)
                    .collect();

                if output.is_text() {
                    if quiet {
                        println!("{} running", running.len());
                    } else if running.is_empty() {
                        println!("No running campaigns");
                    } else {
                        println!("{} running campaign(s):", running.len());
                        for campaign in running {
                            print_watch_line(campaign);
                        }
                    }
                } else {
                    output.print_value(&WatchRecord::Snapshot { data: &running })?;
                }
            }
            PollEvent::Failed(err) => report_failure(output, &err, &config.error_policy)?,
            PollEvent::Stopped(reason) => {
                if !output.is_text() {
                    output.print_value(&WatchRecord::Stopped::<()> {
                        reason: reason_label(reason),
                    })?;
                }
                if reason == StopReason::Failed {
                    anyhow::bail!("Stopped after failed fetch");
                }
                return Ok(());
            }
        }
    }

    Ok(())
}

fn report_failure(output: OutputFormat, err: &FetchError, policy: &ErrorPolicy) -> Result<()> {
    if output.is_text() {
        eprintln!("Fetch failed: {}", err);
        if matches!(policy, ErrorPolicy::Pause) {
            // Nothing will refetch on its own in a terminal session
            eprintln!("Polling paused; interrupt to exit or rerun with --on-error retry");
        }
    } else {
        output.print_value(&WatchRecord::Error::<()> {
            kind: err.kind(),
            message: err.to_string(),
        })?;
    }
    Ok(())
}

fn finish_watch(reason: StopReason, last: Option<CampaignStatus>, id: &str) -> Result<()> {
    match (reason, last) {
        (StopReason::Failed, _) => anyhow::bail!("Stopped watching {} after failed fetch", id),
        (StopReason::Finished, Some(CampaignStatus::Failed)) => {
            anyhow::bail!("Campaign {} failed", id)
        }
        _ => Ok(()),
    }
}

fn reason_label(reason: StopReason) -> &'static str {
    match reason {
        StopReason::Finished => "finished",
        StopReason::Cancelled => "cancelled",
        StopReason::Failed => "failed",
    }
}

fn print_campaign_table(campaigns: &[Campaign]) {
    if campaigns.is_empty() {
        println!("No campaigns found");
        return;
    }

    print_table_header(&[("ID", 36), ("NAME", 28), ("STATUS", 10), ("PROGRESS", 8)]);

    for campaign in campaigns {
        let name = campaign.name.as_deref().unwrap_or("-");
        print_table_row(&[
            (&campaign.id, 36),
            (name, 28),
            (campaign.status.as_str(), 10),
            (&format_progress(campaign.progress), 8),
        ]);
    }
}

fn print_campaign(campaign: &Campaign) {
    print_field("ID", &campaign.id);
    if let Some(name) = &campaign.name {
        print_field("Name", name);
    }
    print_field("Status", campaign.status.as_str());
    print_field("Progress", &format_progress(campaign.progress));
    if let Some(started) = &campaign.started_at {
        print_field("Started", started);
    }
    if let Some(eta) = &campaign.estimated_completion {
        print_field("ETA", &eta.to_rfc3339());
    }
    if let Some(completed) = &campaign.completed_at {
        print_field("Completed", completed);
    }
    if let Some(found) = campaign.total_businesses_found {
        print_field("Businesses", &found.to_string());
    }
    if let Some(found) = campaign.total_emails_found {
        print_field("Emails", &found.to_string());
    }
    if let Some(found) = campaign.total_facebook_pages_found {
        print_field("Facebook", &found.to_string());
    }
    if let Some(found) = campaign.total_linkedin_profiles_found {
        print_field("LinkedIn", &found.to_string());
    }
    if let Some(cost) = campaign.actual_cost {
        print_field("Cost", &format!("${:.2}", cost));
    }
}

fn print_watch_line(campaign: &Campaign) {
    let mut line = format!(
        "[{}] {} {} {}",
        chrono::Local::now().format("%H:%M:%S"),
        campaign.id,
        campaign.status,
        format_progress(campaign.progress)
    );
    if let Some(found) = campaign.total_businesses_found {
        line.push_str(&format!(" • {} businesses", found));
    }
    if let Some(found) = campaign.total_emails_found {
        line.push_str(&format!(" • {} emails", found));
    }
    println!("{}", line);
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::pipeline::PersistOutcome;

pub const GREEN: u32 = 0x00ff00;
pub const ORANGE: u32 = 0xffa500;

/// Run summary handed to the notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub scraped: usize,
    pub upserted: usize,
    pub status: String,
    pub timestamp: String,
}

impl Notification {
    pub fn from_outcome(scraped: usize, outcome: &PersistOutcome, at: DateTime<Utc>) -> Self {
        let (title, description, color) = match outcome {
            PersistOutcome::Success { .. } => (
                "✅ IWF World Records Updated Successfully".to_string(),
                "Daily world records scrape completed.".to_string(),
                GREEN,
            ),
            PersistOutcome::Skipped { message }
            | PersistOutcome::Failed { message }
            | PersistOutcome::DryRun { message } => (
                "⚠️ IWF World Records Update Issue".to_string(),
                message.clone(),
                ORANGE,
            ),
        };
        Self {
            title,
            description,
            color,
            scraped,
            upserted: outcome.upserted(),
            status: outcome.message(),
            timestamp: at.to_rfc3339(),
        }
    }

    /// Discord webhook body: a single embed.
    pub fn to_discord(&self) -> serde_json::Value {
        json!({
            "embeds": [{
                "title": self.title,
                "description": self.description,
                "color": self.color,
                "timestamp": self.timestamp,
                "fields": [
                    { "name": "Records Scraped", "value": self.scraped.to_string(), "inline": true },
                    { "name": "Records Upserted", "value": self.upserted.to_string(), "inline": true },
                    { "name": "Status", "value": self.status, "inline": false },
                ]
            }]
        })
    }
}

#[async_trait(?Send)]
pub trait Notifier {
    async fn send(&self, notification: &Notification) -> Result<()>;
}

pub struct DiscordNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl Notifier for DiscordNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&notification.to_discord())
            .send()
            .await
            .context("Discord webhook request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Discord webhook error {}: {}", status, body);
        }
        info!("Discord notification delivered");
        Ok(())
    }
}

// ── Tests ──

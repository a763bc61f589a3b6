//! Maker-style webhooks client.
//!
//! Each event becomes `GET {base}/trigger/{event}/with/key/{key}`. The service
//! answers 200 on acceptance; anything else is reported as a delivery failure.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;

use super::Notifier;
use crate::constants::WEBHOOKS_TIMEOUT_SECS;

pub struct WebhooksNotifier {
    client: Client,
    base_url: String,
    key: String,
}

impl WebhooksNotifier {
    /// Build a client for `base_url` (e.g. `https://maker.ifttt.com`).
    ///
    /// Must be called outside of any async runtime; the blocking client owns one.
    pub fn new(base_url: &str, key: &str) -> Result<Self> {
        if key.trim().is_empty() {
            anyhow::bail!("webhooks key is empty");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(WEBHOOKS_TIMEOUT_SECS))
            .build()
            .context("Failed to build webhooks HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.trim().to_string(),
        })
    }

    /// The full trigger URL for `event`.
    pub fn trigger_url(&self, event: &str) -> String {
        format!("{}/trigger/{event}/with/key/{}", self.base_url, self.key)
    }

    /// The trigger URL with the key masked, for logs.
    fn redacted_url(&self, event: &str) -> String {
        format!("{}/trigger/{event}/with/key/***", self.base_url)
    }
}

impl Notifier for WebhooksNotifier {
    fn trigger(&self, event: &str) -> Result<()> {
        let response = self
            .client
            .get(self.trigger_url(event))
            .send()
            // reqwest errors embed the request URL, which carries the key
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Failed to reach {}", self.redacted_url(event)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            anyhow::bail!(
                "Webhook '{event}' rejected (HTTP {status}): {}",
                body.trim()
            );
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhooks"
    }
}

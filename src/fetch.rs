use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Outer wrapper of every feed; `data` is itself a JSON document in a string.
#[derive(Debug, Deserialize)]
struct Envelope {
    data: String,
}

/// Blocking client for the news-site statistics feeds.
pub struct Fetcher {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl Fetcher {
    pub fn new(base_url: &str, timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Fetcher {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Feed URL, cache-busted with a millisecond timestamp.
    pub fn feed_url(&self, name: &str, millis: i64) -> String {
        format!(
            "{}/g2/getOnsInfo?name={}&callback=&_={}",
            self.base_url, name, millis
        )
    }

    /// GET a feed, unwrap the envelope and decode the embedded payload.
    pub fn get_payload<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let url = self.feed_url(name, chrono::Utc::now().timestamp_millis());
        tracing::debug!(%url, "requesting feed");
        let envelope: Envelope = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("Bad response from {}", url))?
            .json()
            .with_context(|| format!("Failed to decode envelope from {}", url))?;
        serde_json::from_str(&envelope.data)
            .with_context(|| format!("Failed to decode {} payload", name))
    }
}

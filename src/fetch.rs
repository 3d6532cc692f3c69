use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use once_cell::sync::Lazy;
use tracing::info;
use crate::error::{AppError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// Create a static client to reuse connections
static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(5))
        .pool_max_idle_per_host(10)
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// GETs `url` and returns the body, whatever the status.
pub async fn fetch_html(url: &str) -> Result<String> {
    let start = std::time::Instant::now();
    let response = CLIENT
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::FetchError(format!("Failed to fetch {}: {}", url, e)))?;
    let status = response.status();
    let html = response.text().await?;
    info!("Fetched {} ({}, {} bytes) in {:?}", url, status, html.len(), start.elapsed());
    Ok(html)
}

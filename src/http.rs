// Shared HTTP client utilities

use anyhow::Result;
use reqwest::Client;
use std::time::Duration;

use crate::constants::{HOST_PRODUCT, HTTP_TIMEOUT_SECS};

/// User-Agent in the form the release API sees from the host: `Product/version; site-url`
pub fn host_user_agent(host_version: &str, host_url: &str) -> String {
    format!("{}/{}; {}", HOST_PRODUCT, host_version, host_url)
}

/// Build a client with the bounded request timeout and the given User-Agent
pub fn build_client(user_agent: &str) -> Result<Client> {
    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()?;
    Ok(client)
}

/// Fetch raw bytes from a URL
pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed: {} ({})", url, response.status());
    }

    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_user_agent() {
        assert_eq!(
            host_user_agent("6.4.2", "https://example.com"),
            "WordPress/6.4.2; https://example.com"
        );
    }
}

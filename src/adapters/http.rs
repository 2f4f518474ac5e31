use crate::utils::error::{RenderError, Result};
use reqwest::Client;
use std::time::Duration;

pub fn build_client(timeout_seconds: u64) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("star-render/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// GETs a page and returns its body undecoded. Non-2xx responses are errors.
pub async fn fetch_page(client: &Client, url: &str) -> Result<Vec<u8>> {
    tracing::debug!("Fetching page: {}", url);
    let response = client.get(url).send().await?;
    let status = response.status();
    tracing::debug!("Response status: {}", status);

    if !status.is_success() {
        return Err(RenderError::HttpStatusError {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response.bytes().await?.to_vec())
}

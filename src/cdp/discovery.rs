//! Tab discovery over the target's HTTP endpoint
//!
//! The target lists its debuggable tabs as a JSON array at `<base-url>/json`.
//! The bridge treats that list as the source of truth and never mutates it.

use tracing::debug;

use super::types::TabDescriptor;
use crate::error::{Error, Result};

/// Fetch the current tab list from the target
///
/// Fails with `DiscoveryUnavailable` if the endpoint is unreachable or does
/// not return a JSON array of tab descriptors.
pub async fn fetch_tabs(base_url: &str) -> Result<Vec<TabDescriptor>> {
    let url = format!("{}/json", base_url.trim_end_matches('/'));
    debug!("fetching tab list from {}", url);

    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| Error::discovery_unavailable(format!("failed to create HTTP client: {}", e)))?;

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| Error::discovery_unavailable(format!("discovery fetch failed: {}", e)))?;

    let tabs = response
        .json::<Vec<TabDescriptor>>()
        .await
        .map_err(|e| Error::discovery_unavailable(format!("malformed discovery response: {}", e)))?;

    debug!("target reports {} tabs", tabs.len());
    Ok(tabs)
}

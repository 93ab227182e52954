//! Runner API client

use crate::error::{Error, Result};
use crate::runner::pure::RunnerVersions;

pub const RUNNER_API_URL: &str = "https://lutris.net/api/runners";

/// Fetch the published versions of runner `identifier`.
pub fn fetch_runner_versions(api_base: &str, identifier: &str) -> Result<RunnerVersions> {
    let url = format!("{}/{}", api_base.trim_end_matches('/'), identifier);
    let client = reqwest::blocking::Client::new();
    let response = client
        .get(&url)
        .header("User-Agent", concat!("winerunner/", env!("CARGO_PKG_VERSION")))
        .send()
        .map_err(|e| Error::Download {
            url: url.clone(),
            reason: e.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(Error::Download {
            url,
            reason: format!("HTTP {}", response.status()),
        });
    }

    Ok(response.json()?)
}

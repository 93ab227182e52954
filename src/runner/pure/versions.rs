// Picking a download from the runner API

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RunnerVersion {
    #[serde(default)]
    pub version: String,
    pub architecture: String,
    pub url: String,
    #[serde(default)]
    pub default: bool,
}

/// Response of `GET <api>/runners/<identifier>`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RunnerVersions {
    #[serde(default)]
    pub versions: Vec<RunnerVersion>,
}

/// Download URL for `arch`: the only matching version, or the one flagged
/// default when several match.
pub fn pick_version_url<'a>(doc: &'a RunnerVersions, arch: &str) -> Option<&'a str> {
    let matching: Vec<&RunnerVersion> =
        doc.versions.iter().filter(|v| v.architecture == arch).collect();

    match matching.as_slice() {
        [] => None,
        [only] => Some(only.url.as_str()),
        several => several
            .iter()
            .copied()
            .find(|v| v.default)
            .map(|v| v.url.as_str()),
    }
}

//! Fetching installer artifacts

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Fetches `url` into `dest`.
pub trait Downloader: Send + Sync {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Blocking HTTP download.
pub struct HttpDownloader {
    timeout: Duration,
}

impl HttpDownloader {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new(Duration::from_secs(600))
    }
}

impl Downloader for HttpDownloader {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let failed = |reason: String| Error::Download {
            url: url.to_string(),
            reason,
        };

        tracing::info!(url, dest = %dest.display(), "Downloading");
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("winerunner/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let response = client.get(url).send().map_err(|e| failed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }

        let bytes = response.bytes().map_err(|e| failed(e.to_string()))?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(dest)?;
        file.write_all(&bytes)?;

        tracing::debug!(url, size = bytes.len(), "Download complete");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::sync::Mutex;

    /// Writes fixed content instead of downloading. `None` content fails.
    pub struct FakeDownloader {
        pub content: Option<Vec<u8>>,
        pub fetched: Mutex<Vec<String>>,
    }

    impl FakeDownloader {
        pub fn serving(content: &[u8]) -> Self {
            Self {
                content: Some(content.to_vec()),
                fetched: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                content: None,
                fetched: Mutex::new(Vec::new()),
            }
        }

        pub fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    impl Downloader for FakeDownloader {
        fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
            self.fetched.lock().unwrap().push(url.to_string());
            let Some(content) = &self.content else {
                return Err(Error::Download {
                    url: url.to_string(),
                    reason: "HTTP 404 Not Found".to_string(),
                });
            };
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(dest, content)?;
            Ok(())
        }
    }
}

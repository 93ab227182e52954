//! Operations module (atomic side effects)

pub mod download;
pub mod extract;
pub mod locks;

pub use download::{Downloader, HttpDownloader};
pub use extract::{Extractor, ZipExtractor};
pub use locks::{InstallGuard, InstallLocks};

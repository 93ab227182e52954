//! Installing a runner from an archive

use std::path::Path;

use crate::error::{Error, Result};
use crate::runner::collaborators::Collaborators;

/// Download `url` into the cache, unpack it into `dest` and delete the
/// archive.
pub fn download_and_extract(
    collab: &Collaborators,
    url: &str,
    dest: &Path,
    merge_single: bool,
) -> Result<()> {
    let filename = url
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("runner.zip");
    let archive = collab.dirs.cache.join(filename);

    collab.downloader.fetch(url, &archive)?;
    if !archive.exists() {
        tracing::error!(archive = %archive.display(), "Can't find downloaded archive, aborting install");
        return Err(Error::Download {
            url: url.to_string(),
            reason: format!("{} missing after download", archive.display()),
        });
    }

    std::fs::create_dir_all(dest)?;
    collab.extractor.extract(&archive, dest, merge_single)?;
    std::fs::remove_file(&archive)?;

    tracing::info!(url, dest = %dest.display(), "Runner archive installed");
    Ok(())
}

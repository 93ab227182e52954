//! Sharing state directories between prefixes of different architectures

use std::path::Path;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The directory already pointed at the primary prefix.
    AlreadyLinked,
    /// Nothing was there; a link was created.
    Linked,
    /// A real directory was deleted and replaced by a link.
    Replaced,
}

/// Make `secondary/<subdir>` a symlink to `primary/<subdir>`.
///
/// Replacing a real directory deletes its contents.
pub fn link_shared_dir(primary: &Path, secondary: &Path, subdir: &str) -> Result<LinkOutcome> {
    let target = primary.join(subdir);
    let link = secondary.join(subdir);

    std::fs::create_dir_all(&target)?;

    let outcome = match std::fs::symlink_metadata(&link) {
        Ok(meta) if meta.file_type().is_symlink() => return Ok(LinkOutcome::AlreadyLinked),
        Ok(meta) => {
            let entries = if meta.is_dir() {
                walkdir::WalkDir::new(&link).min_depth(1).into_iter().count()
            } else {
                1
            };
            tracing::warn!(
                path = %link.display(),
                target = %target.display(),
                entries,
                "Replacing directory with a link to the primary prefix, its contents are deleted"
            );
            if meta.is_dir() {
                std::fs::remove_dir_all(&link)?;
            } else {
                std::fs::remove_file(&link)?;
            }
            LinkOutcome::Replaced
        }
        Err(_) => {
            if let Some(parent) = link.parent() {
                std::fs::create_dir_all(parent)?;
            }
            LinkOutcome::Linked
        }
    };

    std::os::unix::fs::symlink(&target, &link)?;
    Ok(outcome)
}

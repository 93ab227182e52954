//! Unpacking downloaded archives

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};

use zip::ZipArchive;

use crate::error::Result;

pub trait Extractor: Send + Sync {
    /// Unpack `archive` into `dest`. With `merge_single`, an archive whose
    /// entries all sit below one top-level directory is unpacked without it.
    fn extract(&self, archive: &Path, dest: &Path, merge_single: bool) -> Result<()>;
}

pub struct ZipExtractor;

/// The directory every entry lives under, if there is exactly one.
fn single_top_level(names: &[PathBuf]) -> Option<PathBuf> {
    let tops: BTreeSet<_> = names
        .iter()
        .filter_map(|n| match n.components().next() {
            Some(Component::Normal(top)) => Some(top.to_os_string()),
            _ => None,
        })
        .collect();
    let nested = names.iter().any(|n| n.components().count() > 1);

    match (tops.len(), nested) {
        (1, true) => tops.into_iter().next().map(PathBuf::from),
        _ => None,
    }
}

impl Extractor for ZipExtractor {
    fn extract(&self, archive: &Path, dest: &Path, merge_single: bool) -> Result<()> {
        let file = File::open(archive)?;
        let mut zip = ZipArchive::new(BufReader::new(file))?;

        let names: Vec<PathBuf> = (0..zip.len())
            .filter_map(|i| zip.by_index(i).ok()?.enclosed_name())
            .collect();
        let strip = if merge_single {
            single_top_level(&names)
        } else {
            None
        };

        tracing::debug!(
            archive = %archive.display(),
            dest = %dest.display(),
            entries = names.len(),
            stripped = ?strip,
            "Extracting"
        );

        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;
            let Some(name) = entry.enclosed_name() else {
                continue;
            };
            let relative = match &strip {
                Some(top) => match name.strip_prefix(top) {
                    Ok(rest) if rest.as_os_str().is_empty() => continue,
                    Ok(rest) => rest.to_path_buf(),
                    Err(_) => name,
                },
                None => name,
            };
            let outpath = dest.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&outpath)?;
                continue;
            }
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = File::create(&outpath)?;
            io::copy(&mut entry, &mut outfile)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Write;
    use std::path::Path;

    use zip::write::SimpleFileOptions;

    /// Write a zip with the given (name, content) files.
    pub fn write_zip(path: &Path, files: &[(&str, &str)]) {
        let mut zip = zip::ZipWriter::new(std::fs::File::create(path).unwrap());
        let options = SimpleFileOptions::default().unix_permissions(0o755);
        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::write_zip;
    use super::*;

    #[test]
    fn merge_single_strips_top_directory() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("wine.zip");
        write_zip(&archive, &[("wine-8.0/bin/wine", "#!"), ("wine-8.0/lib/x", "")]);

        let dest = dir.path().join("out");
        ZipExtractor.extract(&archive, &dest, true).unwrap();

        assert!(dest.join("bin/wine").is_file());
        assert!(!dest.join("wine-8.0").exists());
    }

    #[test]
    fn without_merge_keeps_layout() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("wine.zip");
        write_zip(&archive, &[("wine-8.0/bin/wine", "#!")]);

        let dest = dir.path().join("out");
        ZipExtractor.extract(&archive, &dest, false).unwrap();
        assert!(dest.join("wine-8.0/bin/wine").is_file());
    }

    #[test]
    fn several_top_levels_are_not_merged() {
        let names = vec![PathBuf::from("a/x"), PathBuf::from("b/y")];
        assert_eq!(single_top_level(&names), None);
        let names = vec![PathBuf::from("only-file")];
        assert_eq!(single_top_level(&names), None);
        let names = vec![PathBuf::from("top/x"), PathBuf::from("top")];
        assert_eq!(single_top_level(&names), Some(PathBuf::from("top")));
    }
}

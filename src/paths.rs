use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;

pub static PATH_HOME: LazyLock<PathBuf> = LazyLock::new(|| {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir())
});

pub static PATH_LOCAL_SHARE: LazyLock<PathBuf> = LazyLock::new(|| PATH_HOME.join(".local/share"));

pub static PATH_DATA: LazyLock<PathBuf> = LazyLock::new(|| {
    if let Ok(xdg_data_home) = env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg_data_home).join("winerunner");
    }
    PATH_LOCAL_SHARE.join("winerunner")
});

pub static PATH_RUNNERS: LazyLock<PathBuf> = LazyLock::new(|| PATH_DATA.join("runners"));

pub static PATH_CACHE: LazyLock<PathBuf> = LazyLock::new(|| PATH_DATA.join("cache"));

pub static PATH_TMP: LazyLock<PathBuf> = LazyLock::new(|| PATH_DATA.join("tmp"));

pub static PATH_GAMES: LazyLock<PathBuf> = LazyLock::new(|| PATH_DATA.join("games"));

/// Wine binary: the runner-managed build first, then the system one.
pub static BIN_WINE: LazyLock<PathBuf> = LazyLock::new(|| {
    let managed = PATH_RUNNERS.join("wine/bin/wine");
    if managed.exists() {
        return managed;
    }

    let bin_candidates = [PathBuf::from("/usr/bin"), PathBuf::from("/usr/local/bin")];
    for candidate in &bin_candidates {
        let bin = candidate.join("wine");
        if bin.exists() {
            return bin;
        }
    }

    managed
});

pub static BIN_WINETRICKS: LazyLock<PathBuf> = LazyLock::new(|| {
    let bin_candidates = [
        PATH_RUNNERS.join("winetricks"),
        PathBuf::from("/usr/bin"),
        PathBuf::from("/usr/local/bin"),
    ];

    for candidate in &bin_candidates {
        let bin = candidate.join("winetricks");
        if bin.exists() {
            return bin;
        }
    }

    PathBuf::from("winetricks")
});

/// Directory holding the companion tools next to a given wine binary
/// (`wineserver`, `wineboot`, `regedit` live beside `wine`).
pub fn wine_sibling(wine: &std::path::Path, tool: &str) -> PathBuf {
    match wine.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(tool),
        _ => PathBuf::from(tool),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn wine_sibling_uses_same_directory() {
        let wine = Path::new("/opt/wine/bin/wine");
        assert_eq!(wine_sibling(wine, "wineserver"), PathBuf::from("/opt/wine/bin/wineserver"));
    }

    #[test]
    fn wine_sibling_bare_name_falls_back_to_path_lookup() {
        assert_eq!(wine_sibling(Path::new("wine"), "wineboot"), PathBuf::from("wineboot"));
    }
}

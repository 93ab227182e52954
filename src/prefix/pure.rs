// Pure prefix path construction (no I/O)

use std::path::{Path, PathBuf};

use super::types::Arch;

/// Default prefix location for a runner.
///
/// `<runners>/<kind>/prefix` for 32-bit, `<runners>/<kind>/prefix64` for 64-bit.
pub fn resolve_path(runners_root: &Path, kind: &str, arch: Arch) -> PathBuf {
    let name = match arch {
        Arch::Win32 => "prefix",
        Arch::Win64 => "prefix64",
    };
    runners_root.join(kind).join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win32_and_win64_differ() {
        let root = Path::new("/data/runners");
        assert_eq!(
            resolve_path(root, "winebattlenet", Arch::Win32),
            PathBuf::from("/data/runners/winebattlenet/prefix")
        );
        assert_eq!(
            resolve_path(root, "winebattlenet", Arch::Win64),
            PathBuf::from("/data/runners/winebattlenet/prefix64")
        );
    }

    #[test]
    fn deterministic() {
        let root = Path::new("/r");
        assert_eq!(
            resolve_path(root, "wine", Arch::Win64),
            resolve_path(root, "wine", Arch::Win64)
        );
    }
}

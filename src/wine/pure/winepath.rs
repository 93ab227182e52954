// Windows to Unix path conversion inside a prefix

use std::path::{Path, PathBuf};

/// Map a Windows path to where it lives inside `prefix`.
///
/// `C:\Program Files` becomes `<prefix>/drive_c/Program Files`; other drive
/// letters go through `dosdevices`. Paths that are already absolute Unix
/// paths are returned unchanged. Both separators are accepted since vendor
/// files mix them.
pub fn to_unix_path(prefix: &Path, windows_path: &str) -> PathBuf {
    if windows_path.starts_with('/') {
        return PathBuf::from(windows_path);
    }

    let mut chars = windows_path.chars();
    let (drive, rest) = match (chars.next(), chars.next()) {
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic() => {
            (Some(letter.to_ascii_lowercase()), &windows_path[2..])
        }
        _ => (None, windows_path),
    };

    let mut path = match drive {
        Some('c') | None => prefix.join("drive_c"),
        Some(letter) => prefix.join("dosdevices").join(format!("{}:", letter)),
    };
    for part in rest.split(['\\', '/']).filter(|p| !p.is_empty()) {
        path.push(part);
    }
    path
}

/// Strip a quoted command line from the registry down to its program.
///
/// `"C:\x\Launcher.exe" "%1"` yields `C:\x\Launcher.exe`.
pub fn command_program(command: &str) -> Option<&str> {
    let program = match command.split('"').nth(1) {
        Some(quoted) => quoted,
        None => command.split_whitespace().next()?,
    };
    let program = program.trim_end_matches('\\');
    (!program.is_empty()).then_some(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_c_with_either_separator() {
        let prefix = Path::new("/pfx");
        assert_eq!(
            to_unix_path(prefix, r"C:\Program Files (x86)\Overwatch"),
            PathBuf::from("/pfx/drive_c/Program Files (x86)/Overwatch")
        );
        assert_eq!(
            to_unix_path(prefix, "C:/Program Files (x86)/Overwatch/"),
            PathBuf::from("/pfx/drive_c/Program Files (x86)/Overwatch")
        );
    }

    #[test]
    fn other_drives_use_dosdevices() {
        assert_eq!(
            to_unix_path(Path::new("/pfx"), r"D:\Games"),
            PathBuf::from("/pfx/dosdevices/d:/Games")
        );
    }

    #[test]
    fn unix_paths_pass_through() {
        assert_eq!(to_unix_path(Path::new("/pfx"), "/home/me"), PathBuf::from("/home/me"));
    }

    #[test]
    fn program_from_open_command() {
        assert_eq!(
            command_program(r#""C:\Battle.net\Battle.net Launcher.exe" "%1""#),
            Some(r"C:\Battle.net\Battle.net Launcher.exe")
        );
        assert_eq!(command_program(r"C:\tool.exe %1"), Some(r"C:\tool.exe"));
        assert_eq!(command_program(""), None);
    }
}

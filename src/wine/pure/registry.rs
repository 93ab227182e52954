//! Reading wine `.reg` hive files

use std::collections::BTreeMap;

/// A value stored under a registry key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegValue {
    String(String),
    Dword(u32),
    /// Anything else (`hex:`, `str(2):`...), kept verbatim.
    Raw(String),
    /// Removal marker, only meaningful when writing an import document.
    Delete,
}

impl RegValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RegValue::String(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryKey {
    /// Key path as written in the file, with backslash separators.
    pub path: String,
    pub values: BTreeMap<String, RegValue>,
}

/// A parsed hive such as `user.reg`. Lookups ignore case, as Windows does.
#[derive(Debug, Clone, Default)]
pub struct WineRegistry {
    pub arch: Option<String>,
    keys: BTreeMap<String, RegistryKey>,
}

/// `Software\\Classes`, `Software/Classes/` and `software\classes` all
/// address the same key.
fn normalize_key(path: &str) -> String {
    path.split(['\\', '/'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
        .to_lowercase()
}

/// Read a quoted string starting at the opening quote. Returns the decoded
/// text and whatever follows the closing quote.
fn parse_quoted(s: &str) -> Option<(String, &str)> {
    let mut chars = s.strip_prefix('"')?.char_indices();
    let body = &s[1..];
    let mut out = String::new();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((out, &body[i + 1..])),
            '\\' => match chars.next()?.1 {
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                '0' => out.push('\0'),
                'x' => {
                    let mut code = 0u32;
                    let mut digits = 0;
                    while digits < 4 {
                        let next = chars.clone().next();
                        match next.and_then(|(_, d)| d.to_digit(16)) {
                            Some(d) => {
                                code = code * 16 + d;
                                chars.next();
                                digits += 1;
                            }
                            None => break,
                        }
                    }
                    out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                }
                other => out.push(other),
            },
            other => out.push(other),
        }
    }
    None
}

fn parse_value(raw: &str) -> RegValue {
    if raw.starts_with('"') {
        if let Some((text, _)) = parse_quoted(raw) {
            return RegValue::String(text);
        }
    } else if let Some(hex) = raw.strip_prefix("dword:")
        && let Ok(v) = u32::from_str_radix(hex.trim(), 16)
    {
        return RegValue::Dword(v);
    } else if raw == "-" {
        return RegValue::Delete;
    }
    RegValue::Raw(raw.to_string())
}

/// Parse the text of a `.reg` file. Unreadable lines are skipped.
pub fn parse_registry(text: &str) -> WineRegistry {
    let mut registry = WineRegistry::default();
    let mut current: Option<RegistryKey> = None;
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        let line = line.trim_end_matches('\r');

        if let Some(arch) = line.strip_prefix("#arch=") {
            registry.arch = Some(arch.trim().to_string());
            continue;
        }

        if line.starts_with('[') {
            if let Some(key) = current.take() {
                registry.keys.insert(normalize_key(&key.path), key);
            }
            let Some(end) = line.rfind(']') else {
                continue;
            };
            // Key names in hives escape their separators.
            let path = line[1..end].replace("\\\\", "\\");
            let normalized = normalize_key(&path);
            current = Some(
                registry
                    .keys
                    .remove(&normalized)
                    .unwrap_or(RegistryKey { path, values: BTreeMap::new() }),
            );
            continue;
        }

        let Some(key) = current.as_mut() else {
            continue;
        };

        let (name, rest) = if let Some(rest) = line.strip_prefix('@') {
            ("default".to_string(), rest)
        } else if line.starts_with('"') {
            match parse_quoted(line) {
                Some(parsed) => parsed,
                None => continue,
            }
        } else {
            continue;
        };
        let Some(raw) = rest.strip_prefix('=') else {
            continue;
        };

        // Binary values continue over lines ending in a backslash.
        let mut raw = raw.to_string();
        while raw.ends_with('\\') {
            raw.pop();
            match lines.next() {
                Some(next) => raw.push_str(next.trim()),
                None => break,
            }
        }

        key.values.insert(name, parse_value(&raw));
    }

    if let Some(key) = current.take() {
        registry.keys.insert(normalize_key(&key.path), key);
    }
    registry
}

impl WineRegistry {
    pub fn key(&self, path: &str) -> Option<&RegistryKey> {
        self.keys.get(&normalize_key(path))
    }

    pub fn get(&self, path: &str, name: &str) -> Option<&RegValue> {
        let key = self.key(path)?;
        key.values.get(name).or_else(|| {
            key.values
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
    }

    /// String value `name` of `path`. The unnamed value is `"default"`.
    pub fn query(&self, path: &str, name: &str) -> Option<&str> {
        self.get(path, name)?.as_str()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Render keys as a document `regedit` can import.
pub fn render_import(keys: &[RegistryKey]) -> String {
    fn quote(s: &str) -> String {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    }

    let mut out = String::from("REGEDIT4\n");
    for key in keys {
        out.push_str(&format!("\n[{}]\n", key.path));
        for (name, value) in &key.values {
            let name = if name == "default" { "@".to_string() } else { quote(name) };
            let value = match value {
                RegValue::String(s) => quote(s),
                RegValue::Dword(v) => format!("dword:{:08x}", v),
                RegValue::Raw(raw) => raw.clone(),
                RegValue::Delete => "-".to_string(),
            };
            out.push_str(&format!("{}={}\n", name, value));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_REG: &str = r#"WINE REGISTRY Version 2
;; All keys relative to \\User\\S-1-5-21-0-0-0-1000

#arch=win32

[Software\\Classes\\blizzard\\Shell\\Open\\Command] 1541262121
#time=1d473a0f4a5a2b6
@="\"C:\\Program Files (x86)\\Battle.net\\Battle.net Launcher.exe\" \"%1\""

[Software\\Wine\\DirectInput] 1541262121
"MouseWarpOverride"="force"
"Count"=dword:0000000a
"Blob"=hex:01,02,\
  03,04
"#;

    #[test]
    fn reads_default_value_with_escapes() {
        let registry = parse_registry(USER_REG);
        assert_eq!(registry.arch.as_deref(), Some("win32"));
        assert_eq!(
            registry.query("Software/Classes/blizzard/Shell/Open/Command", "default"),
            Some(r#""C:\Program Files (x86)\Battle.net\Battle.net Launcher.exe" "%1""#)
        );
    }

    #[test]
    fn lookups_ignore_case_and_separator() {
        let registry = parse_registry(USER_REG);
        assert_eq!(
            registry.query(r"software\wine\directinput", "mousewarpoverride"),
            Some("force")
        );
        assert_eq!(
            registry.get("Software/Wine/DirectInput", "Count"),
            Some(&RegValue::Dword(10))
        );
        assert_eq!(
            registry.get("Software/Wine/DirectInput", "Blob"),
            Some(&RegValue::Raw("hex:01,02,03,04".to_string()))
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn missing_key_or_value() {
        let registry = parse_registry(USER_REG);
        assert!(registry.query("Software/Nope", "default").is_none());
        assert!(registry.query("Software/Wine/DirectInput", "Nope").is_none());
        assert!(parse_registry("").is_empty());
    }

    #[test]
    fn import_document_round_trips_through_parser() {
        let mut key = RegistryKey {
            path: r"HKEY_CURRENT_USER\Software\Wine\Explorer".to_string(),
            ..Default::default()
        };
        key.values.insert("Desktop".into(), RegValue::String("WineDesktop".into()));
        key.values.insert("Gone".into(), RegValue::Delete);

        let doc = render_import(&[key]);
        assert!(doc.starts_with("REGEDIT4\n"));
        assert!(doc.contains("\"Gone\"=-\n"));

        let parsed = parse_registry(&doc);
        assert_eq!(
            parsed.query(r"HKEY_CURRENT_USER\Software\Wine\Explorer", "Desktop"),
            Some("WineDesktop")
        );
    }
}

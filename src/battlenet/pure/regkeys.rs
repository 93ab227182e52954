// Registry settings applied to a fresh client prefix

use std::collections::BTreeMap;

use crate::wine::{RegValue, RegistryKey};

/// Keep wine from creating desktop entries for every helper the client
/// installs, and keep the mouse inside fullscreen games.
pub fn client_registry_keys() -> Vec<RegistryKey> {
    vec![
        RegistryKey {
            path: r"HKEY_CURRENT_USER\Software\Wine\DllOverrides".to_string(),
            values: BTreeMap::from([(
                "winemenubuilder.exe".to_string(),
                RegValue::String(String::new()),
            )]),
        },
        RegistryKey {
            path: r"HKEY_CURRENT_USER\Software\Wine\DirectInput".to_string(),
            values: BTreeMap::from([(
                "MouseWarpOverride".to_string(),
                RegValue::String("force".to_string()),
            )]),
        },
    ]
}

// Client config document merging

use serde_json::{Map, Value};

/// Overlay `overlay` onto `base`. Nested objects merge key by key; any other
/// value in `overlay` replaces the one in `base`.
pub fn selective_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        selective_merge(existing, value)
                    }
                    _ => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Settings written when the client is installed.
pub fn default_client_config() -> Value {
    serde_json::json!({
        "Client": {
            "HardwareAcceleration": "false",
            "Sound": {"Enabled": "false"},
            "Streaming": {"StreamingEnabled": "false"}
        }
    })
}

/// Client settings driven by runner options.
pub fn client_overrides(hwaccel: bool, streaming: bool) -> Value {
    let flag = |on: bool| Value::String(if on { "true" } else { "false" }.to_string());
    let mut streaming_section = Map::new();
    streaming_section.insert("StreamingEnabled".to_string(), flag(streaming));
    serde_json::json!({
        "Client": {
            "HardwareAcceleration": flag(hwaccel),
            "Streaming": Value::Object(streaming_section)
        }
    })
}

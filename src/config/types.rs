use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::process::ShutdownPolicy;

/// Application settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Wine binary to use instead of the managed or system one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wine_path: Option<PathBuf>,
    /// Interval between liveness polls of running processes
    #[serde(default = "default_heartbeat_ms")]
    pub heartbeat_ms: u64,
    #[serde(default)]
    pub shutdown: ShutdownPolicy,
    #[serde(default)]
    pub disable_runtime: bool,
}

fn default_heartbeat_ms() -> u64 {
    2000
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            wine_path: None,
            heartbeat_ms: default_heartbeat_ms(),
            shutdown: ShutdownPolicy::default(),
            disable_runtime: false,
        }
    }
}

/// A single option value as written in YAML.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Text(String),
}

impl OptionValue {
    pub fn as_bool(&self) -> bool {
        match self {
            OptionValue::Bool(b) => *b,
            OptionValue::Text(s) => matches!(s.as_str(), "true" | "1" | "yes" | "on"),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            OptionValue::Bool(_) => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

/// Which part of a game configuration an option belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Game,
    Runner,
    System,
}

/// Per-game configuration, stored as `games/<slug>.yaml`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct GameConfig {
    #[serde(default)]
    pub game: BTreeMap<String, OptionValue>,
    #[serde(default)]
    pub runner: BTreeMap<String, OptionValue>,
    #[serde(default)]
    pub system: BTreeMap<String, OptionValue>,
}

impl GameConfig {
    pub fn section(&self, section: Section) -> &BTreeMap<String, OptionValue> {
        match section {
            Section::Game => &self.game,
            Section::Runner => &self.runner,
            Section::System => &self.system,
        }
    }

    pub fn section_mut(&mut self, section: Section) -> &mut BTreeMap<String, OptionValue> {
        match section {
            Section::Game => &mut self.game,
            Section::Runner => &mut self.runner,
            Section::System => &mut self.system,
        }
    }

    pub fn get(&self, section: Section, key: &str) -> Option<&OptionValue> {
        self.section(section).get(key)
    }

    pub fn set(&mut self, section: Section, key: &str, value: impl Into<OptionValue>) {
        self.section_mut(section).insert(key.to_string(), value.into());
    }

    /// Layer `other` on top of `self`; keys set in `other` win.
    pub fn merged(&self, other: &GameConfig) -> GameConfig {
        let mut out = self.clone();
        out.game.extend(other.game.clone());
        out.runner.extend(other.runner.clone());
        out.system.extend(other.system.clone());
        out
    }
}

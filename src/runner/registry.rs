//! Runner lookup by identifier and the default-config cache

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::{GameConfig, SettingsStore, load_game_config_from, save_game_config_to};
use crate::error::{Error, Result};
use crate::paths::PATH_DATA;
use crate::runner::Runner;
use crate::runner::operations::sync_at_startup;

/// Builds a runner for one game configuration.
pub type RunnerFactory = Box<dyn Fn(GameConfig) -> Arc<dyn Runner> + Send + Sync>;

pub const CONFIG_CACHE_CAPACITY: usize = 50;

/// Bounded least-recently-used map of runner default configs.
struct ConfigCache {
    capacity: usize,
    entries: HashMap<String, GameConfig>,
    order: VecDeque<String>,
}

impl ConfigCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
        self.order.push_back(key.to_string());
    }

    fn get(&mut self, key: &str) -> Option<GameConfig> {
        let config = self.entries.get(key).cloned()?;
        self.touch(key);
        Some(config)
    }

    fn insert(&mut self, key: &str, config: GameConfig) {
        self.entries.insert(key.to_string(), config);
        self.touch(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                tracing::debug!(runner = %oldest, "Evicting cached runner config");
                self.entries.remove(&oldest);
            }
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
        self.entries.remove(key).is_some()
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

/// Known runners and their default configurations.
pub struct RunnerRegistry {
    factories: BTreeMap<String, RunnerFactory>,
    config_dir: PathBuf,
    cache: Mutex<ConfigCache>,
}

impl RunnerRegistry {
    pub fn new() -> Self {
        Self::with_config_dir(PATH_DATA.join("runners-config"))
    }

    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self {
            factories: BTreeMap::new(),
            config_dir,
            cache: Mutex::new(ConfigCache::new(CONFIG_CACHE_CAPACITY)),
        }
    }

    pub fn register(&mut self, identifier: &str, factory: RunnerFactory) {
        self.factories.insert(identifier.to_string(), factory);
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    fn config_path(&self, identifier: &str) -> PathBuf {
        self.config_dir.join(format!("{}.yaml", identifier))
    }

    /// Default configuration of a runner, read once and then served from the
    /// cache until invalidated.
    pub fn default_config(&self, identifier: &str) -> Result<GameConfig> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| Error::Config("runner config cache poisoned".to_string()))?;
        if let Some(config) = cache.get(identifier) {
            return Ok(config);
        }

        let config = load_game_config_from(&self.config_path(identifier))?;
        cache.insert(identifier, config.clone());
        Ok(config)
    }

    /// Drop the cached default configuration of `identifier`.
    pub fn invalidate(&self, identifier: &str) {
        if let Ok(mut cache) = self.cache.lock()
            && cache.remove(identifier)
        {
            tracing::debug!(runner = identifier, "Runner config invalidated");
        }
    }

    pub fn save_default_config(&self, identifier: &str, config: &GameConfig) -> Result<()> {
        save_game_config_to(&self.config_path(identifier), config)?;
        self.invalidate(identifier);
        Ok(())
    }

    pub fn is_cached(&self, identifier: &str) -> bool {
        self.cache.lock().is_ok_and(|c| c.contains(identifier))
    }

    /// Runner `identifier` configured with its defaults overlaid by `game_config`.
    pub fn create(&self, identifier: &str, game_config: &GameConfig) -> Result<Arc<dyn Runner>> {
        let factory = self
            .factories
            .get(identifier)
            .ok_or_else(|| Error::Config(format!("unknown runner {}", identifier)))?;
        let config = self.default_config(identifier)?.merged(game_config);
        Ok(factory(config))
    }

    /// Runners whose library sync is enabled at startup.
    pub fn startup_syncs(&self, settings: &dyn SettingsStore) -> Vec<&str> {
        self.factories
            .keys()
            .map(String::as_str)
            .filter(|id| sync_at_startup(settings, id))
            .collect()
    }
}

impl Default for RunnerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JsonSettingsStore, Section};
    use crate::install::FakeDownloader;
    use crate::runner::archive::{ArchiveRunner, RunnerSource};
    use crate::runner::collaborators::fakes::TestBed;
    use crate::runner::operations::set_sync_at_startup;
    use crate::runner::types::RunnerInfo;

    #[test]
    fn cache_evicts_least_recently_used() {
        let mut cache = ConfigCache::new(2);
        cache.insert("a", GameConfig::default());
        cache.insert("b", GameConfig::default());
        assert!(cache.get("a").is_some());
        cache.insert("c", GameConfig::default());

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn saving_invalidates_cached_config() {
        let dir = tempfile::tempdir().unwrap();
        let registry = RunnerRegistry::with_config_dir(dir.path().to_path_buf());

        assert_eq!(registry.default_config("wine").unwrap(), GameConfig::default());
        assert!(registry.is_cached("wine"));

        let mut config = GameConfig::default();
        config.set(Section::System, "disable_runtime", true);
        registry.save_default_config("wine", &config).unwrap();
        assert!(!registry.is_cached("wine"));
        assert_eq!(registry.default_config("wine").unwrap(), config);
    }

    #[test]
    fn create_layers_game_config_over_defaults() {
        let bed = TestBed::new(FakeDownloader::serving(b""), true);
        let mut registry = RunnerRegistry::with_config_dir(bed.dir.path().join("runners-config"));
        let collab = bed.collab.clone();
        registry.register(
            "dosbox",
            Box::new(move |config| {
                let info = RunnerInfo {
                    identifier: "dosbox".into(),
                    name: "DOSBox".into(),
                    description: String::new(),
                    platforms: vec![],
                    runnable_alone: true,
                };
                let source = RunnerSource::Api {
                    base_url: "https://runners.invalid".into(),
                };
                Arc::new(ArchiveRunner::new(info, "bin/dosbox".into(), source, collab.clone(), config))
            }),
        );

        let mut defaults = GameConfig::default();
        defaults.set(Section::Game, "args", "-fullscreen");
        registry.save_default_config("dosbox", &defaults).unwrap();

        let mut game = GameConfig::default();
        game.set(Section::Game, "main_file", "/games/keen/keen.exe");
        let runner = registry.create("dosbox", &game).unwrap();
        assert_eq!(runner.info().identifier, "dosbox");
        // Not installed, so play reports the missing executable
        assert!(runner.play().is_err());

        assert!(registry.create("scummvm", &game).is_err());
    }

    #[test]
    fn startup_syncs_follow_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::open(dir.path().join("preferences.json"));
        let mut registry = RunnerRegistry::with_config_dir(dir.path().to_path_buf());
        let bed = TestBed::new(FakeDownloader::serving(b""), true);
        for id in ["dosbox", "winebattlenet"] {
            let collab = bed.collab.clone();
            registry.register(
                id,
                Box::new(move |config| {
                    let info = RunnerInfo {
                        identifier: "dosbox".into(),
                        name: "DOSBox".into(),
                        description: String::new(),
                        platforms: vec![],
                        runnable_alone: false,
                    };
                    Arc::new(ArchiveRunner::new(
                        info,
                        "bin/dosbox".into(),
                        RunnerSource::Api { base_url: String::new() },
                        collab.clone(),
                        config,
                    ))
                }),
            );
        }

        set_sync_at_startup(&store, "winebattlenet", true).unwrap();
        assert_eq!(registry.startup_syncs(&store), vec!["winebattlenet"]);
        assert_eq!(registry.identifiers(), vec!["dosbox", "winebattlenet"]);
    }
}

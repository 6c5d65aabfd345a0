//! Top-level wiring owned by the host.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::command;
use crate::config::{
    ConfigError,
    ConfigManager,
};
use crate::fetch::{
    FsFetcher,
    ResourceFetcher,
};
use crate::loader::{
    DataLoader,
    DataStore,
    DataTransform,
    MarkerOverlay,
};
use crate::service::LocalizationService;

/// Localization service, data loader and configuration in one place.
#[derive(Clone)]
pub struct I18nEngine {
    /// Active locale and bundle cache
    service: LocalizationService,
    /// Loads and publishes data files
    loader: DataLoader,
    /// Settings and persisted config
    pub config_manager: Arc<Mutex<ConfigManager>>,
}

impl std::fmt::Debug for I18nEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18nEngine")
            .field("service", &self.service)
            .field("loader", &self.loader)
            .field("config_manager", &"<ConfigManager>")
            .finish()
    }
}

impl I18nEngine {
    /// Build an engine from already loaded settings.
    ///
    /// Bundles and data files are both read through `fetcher`; `transform` is
    /// applied to every data file before it is published.
    #[must_use]
    pub fn new(
        config_manager: ConfigManager,
        fetcher: Arc<dyn ResourceFetcher>,
        transform: Arc<dyn DataTransform>,
    ) -> Self {
        let settings = config_manager.get_settings();
        let service = LocalizationService::new(
            Arc::clone(&fetcher),
            settings.resource_folder.clone(),
            &settings.default_locale,
        );
        let loader = DataLoader::new(fetcher, settings.data_directory.clone(), transform);

        Self { service, loader, config_manager: Arc::new(Mutex::new(config_manager)) }
    }

    /// Build an engine for a game directory on disk.
    ///
    /// Reads `i18n.json` from `game_root` if present and overlays marked
    /// strings in every loaded data file.
    pub fn from_game_root(game_root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let game_root = game_root.into();
        let mut config_manager = ConfigManager::new();
        config_manager.load_settings(Some(game_root.clone()))?;

        let fetcher: Arc<dyn ResourceFetcher> = Arc::new(FsFetcher::new(game_root));
        Ok(Self::new(config_manager, fetcher, Arc::new(MarkerOverlay)))
    }

    #[must_use]
    pub const fn service(&self) -> &LocalizationService {
        &self.service
    }

    #[must_use]
    pub const fn loader(&self) -> &DataLoader {
        &self.loader
    }

    #[must_use]
    pub fn store(&self) -> &Arc<DataStore> {
        self.loader.store()
    }

    /// Restore the persisted configuration, switching to its language.
    ///
    /// Without a config file, or without `language` in it, the environment
    /// language is requested. An unreadable file leaves the active locale
    /// unchanged.
    pub async fn restore_config(&self) {
        let mut config_manager = self.config_manager.lock().await;
        if let Err(e) = config_manager.load(&self.service).await {
            tracing::warn!("Failed to restore config: {}", e);
        }
    }

    /// Persist the current configuration, including the active locale.
    ///
    /// Failures are logged, not returned.
    pub async fn save_config(&self) {
        let mut config_manager = self.config_manager.lock().await;
        if let Err(e) = config_manager.save(&self.service).await {
            tracing::error!("Failed to save config: {}", e);
        }
    }

    /// Load a named data file.
    pub async fn load_named(&self, name: &str, src: &str) {
        self.loader.load_named(name, src).await;
    }

    /// Dispatch a host command. Returns `false` if the command is not ours.
    pub async fn execute_command(&self, name: &str, arguments: &[Value]) -> bool {
        command::handle_execute_command(self, name, arguments).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    /// テスト用のゲームディレクトリ
    fn game_dir() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("locales")).unwrap();
        fs::write(root.join("i18n.json"), r#"{"resourceFolder": "locales"}"#).unwrap();
        fs::write(root.join("locales").join("ja-JP.json"), r#"{"Potion": "ポーション"}"#)
            .unwrap();
        fs::create_dir_all(root.join("data")).unwrap();
        fs::write(root.join("data").join("Items.json"), r#"[null, {"name": "__ Potion"}]"#)
            .unwrap();
        temp_dir
    }

    #[tokio::test]
    async fn from_game_root_reads_settings() {
        let temp_dir = game_dir();

        let engine = I18nEngine::from_game_root(temp_dir.path()).unwrap();

        assert_eq!(engine.service().cache().resource_folder(), "locales");
        assert_eq!(engine.service().active_locale().as_str(), "en-US");
    }

    #[tokio::test]
    async fn from_game_root_normalizes_default_locale() {
        let temp_dir = game_dir();
        fs::write(temp_dir.path().join("i18n.json"), r#"{"defaultLocale": "JA-jp"}"#).unwrap();

        let engine = I18nEngine::from_game_root(temp_dir.path()).unwrap();

        assert_eq!(engine.service().default_locale().as_str(), "ja-JP");
        assert_eq!(engine.service().active_locale().as_str(), "ja-JP");
    }

    #[tokio::test]
    async fn loaded_data_follows_locale_switches() {
        let temp_dir = game_dir();
        let engine = I18nEngine::from_game_root(temp_dir.path()).unwrap();
        engine.load_named("$dataItems", "Items.json").await;

        let read = |engine: &I18nEngine| {
            engine
                .store()
                .with("$dataItems", |node| {
                    node.pointer("/1/name").and_then(|n| n.text(engine.service()))
                })
                .flatten()
        };
        assert_eq!(read(&engine).as_deref(), Some("Potion"));

        engine.service().set_active_locale(Some("ja-JP")).await;
        assert_eq!(read(&engine).as_deref(), Some("ポーション"));
    }

    #[tokio::test]
    async fn restore_config_without_file_keeps_engine_usable() {
        let temp_dir = game_dir();
        let engine = I18nEngine::from_game_root(temp_dir.path()).unwrap();

        engine.restore_config().await;

        // No saved language: the environment language is requested, which has
        // no bundle here unless it happens to be ja-JP.
        let active = engine.service().active_locale();
        assert!(active.as_str() == "en-US" || active.as_str() == "ja-JP");
    }

    #[tokio::test]
    async fn save_then_restore_round_trip() {
        let temp_dir = game_dir();
        let engine = I18nEngine::from_game_root(temp_dir.path()).unwrap();
        engine.service().set_active_locale(Some("ja-jp")).await;
        engine.save_config().await;

        let restarted = I18nEngine::from_game_root(temp_dir.path()).unwrap();
        restarted.restore_config().await;

        assert_eq!(restarted.service().active_locale().as_str(), "ja-JP");
    }
}

//! 設定管理を行うモジュール

use std::path::PathBuf;

use super::{
    ConfigError,
    LocalizationSettings,
    PersistedConfig,
    loader,
};
use crate::service::LocalizationService;

/// プレイヤー設定の保存先（ゲームルートからの相対パス）
const PERSISTED_CONFIG_PATH: [&str; 2] = ["save", "config.json"];

/// 設定管理を行う
///
/// 起動時の静的設定（`LocalizationSettings`）と、
/// 保存・復元されるプレイヤー設定（`PersistedConfig`）を扱う。
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: LocalizationSettings,

    /// ゲームのルートパス
    game_root: Option<PathBuf>,

    /// 最後に適用・保存したプレイヤー設定
    persisted: PersistedConfig,
}

impl ConfigManager {
    /// 新しい設定マネージャーを作成
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_settings: LocalizationSettings::default(),
            game_root: None,
            persisted: PersistedConfig::default(),
        }
    }

    /// 設定を読み込む
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_settings(&mut self, game_root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings for game root: {:?}", game_root);

        let mut settings = if let Some(root) = &game_root {
            loader::load_from_game_root(root)?.map_or_else(LocalizationSettings::default, |s| {
                tracing::debug!("Loaded settings: {:?}", s);
                s
            })
        } else {
            LocalizationSettings::default()
        };

        settings.normalize_default_locale();
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        self.game_root = game_root;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    /// 現在の設定を取得
    #[must_use]
    pub const fn get_settings(&self) -> &LocalizationSettings {
        &self.current_settings
    }

    /// ゲームルートを取得
    #[must_use]
    pub const fn game_root(&self) -> Option<&PathBuf> {
        self.game_root.as_ref()
    }

    /// 最後に適用・保存したプレイヤー設定を取得
    #[must_use]
    pub const fn persisted(&self) -> &PersistedConfig {
        &self.persisted
    }

    /// プレイヤー設定ファイルのパス
    #[must_use]
    pub fn persisted_config_path(&self) -> Option<PathBuf> {
        self.game_root
            .as_ref()
            .map(|root| PERSISTED_CONFIG_PATH.iter().fold(root.clone(), |acc, part| acc.join(part)))
    }

    /// 保存用のプレイヤー設定を作成（現在の言語を含める）
    #[must_use]
    pub fn make_data(&self, service: &LocalizationService) -> PersistedConfig {
        let mut config = self.persisted.clone();
        config.language = Some(service.active_locale().into());
        config
    }

    /// プレイヤー設定を適用する
    ///
    /// `language` を `LocalizationService` に渡し、通常の言語切り替えと同じく
    /// 読み込み失敗時はデフォルト言語にフォールバックする。
    pub async fn apply_data(&mut self, service: &LocalizationService, config: PersistedConfig) {
        let active = service.set_active_locale(config.language.as_deref()).await;
        tracing::debug!(language = ?config.language, active = %active, "Applied persisted config");
        self.persisted = config;
    }

    /// プレイヤー設定を保存する
    ///
    /// # Errors
    /// - ゲームルートが未設定の場合は何もしない
    /// - ファイル書き込みエラー
    pub async fn save(&mut self, service: &LocalizationService) -> Result<(), ConfigError> {
        let config = self.make_data(service);

        if let Some(path) = self.persisted_config_path() {
            loader::write_persisted(&path, &config).await?;
        } else {
            tracing::debug!("No game root, config kept in memory only");
        }

        self.persisted = config;
        Ok(())
    }

    /// プレイヤー設定を読み込んで適用する
    ///
    /// ファイルがない場合は空の設定を適用する（言語は環境から検出される）。
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    pub async fn load(&mut self, service: &LocalizationService) -> Result<(), ConfigError> {
        let config = match self.persisted_config_path() {
            Some(path) => loader::read_persisted(&path).await?.unwrap_or_default(),
            None => PersistedConfig::default(),
        };

        self.apply_data(service, config).await;
        Ok(())
    }
}

//! 設定ファイルの読み書き関数

use std::path::Path;

use super::{
    ConfigError,
    LocalizationSettings,
    PersistedConfig,
};

/// 設定ファイル名
pub(super) const SETTINGS_FILE: &str = "i18n.json";

/// ゲームルートから設定を読み込む
///
/// `i18n.json` ファイルを探して読み込む
///
/// # Returns
/// - `Ok(Some(settings))`: 設定ファイルが見つかり、読み込みに成功
/// - `Ok(None)`: 設定ファイルが見つからない
/// - `Err(ConfigError)`: ファイル読み込みまたはパースエラー
pub(super) fn load_from_game_root(
    game_root: &Path,
) -> Result<Option<LocalizationSettings>, ConfigError> {
    let settings_path = game_root.join(SETTINGS_FILE);

    if !settings_path.exists() {
        tracing::debug!("Settings file not found: {:?}", settings_path);
        return Ok(None);
    }

    tracing::debug!("Loading settings from: {:?}", settings_path);

    let content = std::fs::read_to_string(&settings_path)?;
    let settings: LocalizationSettings = serde_json::from_str(&content)?;

    Ok(Some(settings))
}

/// 保存済みのプレイヤー設定を読み込む
///
/// ファイルが存在しない場合は `Ok(None)` を返す
pub(super) async fn read_persisted(path: &Path) -> Result<Option<PersistedConfig>, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("Persisted config not found: {:?}", path);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Some(serde_json::from_str(&content)?))
}

/// プレイヤー設定を書き込む（親ディレクトリがなければ作成）
pub(super) async fn write_persisted(
    path: &Path,
    config: &PersistedConfig,
) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = serde_json::to_string(config)?;
    tokio::fs::write(path, content).await?;
    tracing::debug!("Persisted config written to: {:?}", path);

    Ok(())
}

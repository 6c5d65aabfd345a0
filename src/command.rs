//! Host command handling.
//!
//! The only command is `i18n <locale>`, which switches the active locale and
//! saves the configuration right away.

use serde::Deserialize;
use serde_json::Value;

use crate::engine::I18nEngine;

/// Name of the language switch command.
pub const SET_LANGUAGE_COMMAND: &str = "i18n";

/// Object form of the `i18n` arguments (`{"language": "en-US"}`).
#[derive(Debug, Deserialize)]
struct SetLanguageArgs {
    /// Requested locale; absent means the environment language
    language: Option<String>,
}

/// Dispatch a host command.
///
/// Returns `true` when the command was handled here. Unknown commands are
/// left to the host.
pub async fn handle_execute_command(
    engine: &I18nEngine,
    command: &str,
    arguments: &[Value],
) -> bool {
    tracing::debug!(command = %command, "Execute command request");

    match command {
        SET_LANGUAGE_COMMAND => {
            handle_set_language(engine, arguments).await;
            true
        }
        _ => {
            tracing::debug!("Ignoring command: {}", command);
            false
        }
    }
}

/// `i18n` コマンドを実行
///
/// # Arguments
/// * `arguments[0]` - 言語コード（文字列、または `{"language": ...}`）
///
/// 引数がない場合は環境の言語を使用する。
/// 失敗してもエラーは返さず、デフォルト言語にフォールバックする。
async fn handle_set_language(engine: &I18nEngine, arguments: &[Value]) {
    let language = arguments.first().and_then(language_argument);
    tracing::debug!(language = ?language, "Executing i18n");

    engine.service().set_active_locale(language.as_deref()).await;
    engine.save_config().await;
}

/// Extract the locale from a plain string or an object argument.
fn language_argument(argument: &Value) -> Option<String> {
    match argument {
        Value::String(language) => Some(language.clone()),
        Value::Object(_) => match serde_json::from_value::<SetLanguageArgs>(argument.clone()) {
            Ok(args) => args.language,
            Err(e) => {
                tracing::warn!("Invalid arguments for i18n: {}", e);
                None
            }
        },
        _ => {
            tracing::warn!("Invalid argument for i18n: {}", argument);
            None
        }
    }
}

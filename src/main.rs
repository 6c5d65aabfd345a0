//! Command line entry point.
//!
//! Loads one data file from a game directory, switches to the requested
//! locale and writes the resolved JSON to stdout.
//!
//! ```text
//! i18n-overlay <game-root> <data-file> [locale]
//! ```

use std::process::ExitCode;

use game_i18n_overlay::I18nEngine;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

/// Dataset name used for the single loaded file.
const DATASET: &str = "$data";

#[tokio::main]
async fn main() -> ExitCode {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(writer)
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(game_root), Some(data_file)) = (args.next(), args.next()) else {
        tracing::error!("Usage: i18n-overlay <game-root> <data-file> [locale]");
        return ExitCode::from(2);
    };
    let locale = args.next();

    let engine = match I18nEngine::from_game_root(&game_root) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("Failed to initialize: {}", e);
            return ExitCode::FAILURE;
        }
    };

    engine.restore_config().await;
    if let Some(locale) = locale {
        engine.execute_command("i18n", &[serde_json::Value::String(locale)]).await;
    }

    engine.load_named(DATASET, &data_file).await;
    if let Some(url) = engine.store().take_error() {
        tracing::error!("Failed to load {}", url);
        return ExitCode::FAILURE;
    }

    let service = engine.service();
    let Some(resolved) = engine.store().with(DATASET, |node| node.resolve(service)) else {
        return ExitCode::FAILURE;
    };
    tracing::info!(locale = %service.active_locale(), "Resolved {}", data_file);

    let untranslated = engine
        .store()
        .with(DATASET, |node| {
            node.translatable_keys()
                .into_iter()
                .filter(|key| service.translation(key).is_none())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    for key in &untranslated {
        tracing::debug!(key = %key, "No translation");
    }
    if !untranslated.is_empty() {
        tracing::warn!(
            locale = %service.active_locale(),
            "{} marked strings have no translation",
            untranslated.len()
        );
    }

    let output = match serde_json::to_vec_pretty(&resolved) {
        Ok(output) => output,
        Err(e) => {
            tracing::error!("Failed to serialize output: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = tokio::io::stdout();
    if let Err(e) = stdout.write_all(&output).await.and(stdout.flush().await) {
        tracing::error!("Failed to write output: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

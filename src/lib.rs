//! game-i18n-overlay
//!
//! Lazy localization overlay for JSON game data. Strings marked with `"__ "`
//! are resolved against the active locale's bundle every time they are read,
//! so the language can be switched while the game is running.

pub mod bundle;
pub mod command;
pub mod config;
pub mod engine;
pub mod fetch;
pub mod loader;
pub mod locale;
pub mod overlay;
pub mod resolver;
pub mod service;
mod test_utils;

// 主要な型を再エクスポート
pub use engine::I18nEngine;
pub use overlay::{
    OverlayNode,
    TranslatableField,
};
pub use service::LocalizationService;

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};
use thiserror::Error;

use crate::locale::normalize;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "defaultLocale")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to access configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Static localization settings, read once at startup.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalizationSettings {
    /// Locale activated when a requested locale cannot be loaded.
    pub default_locale: String,

    /// Folder holding `<locale>.json` bundles, relative to the game root.
    pub resource_folder: String,

    /// Folder holding data files, relative to the game root.
    pub data_directory: String,
}

impl LocalizationSettings {
    /// Rewrite `defaultLocale` in normalized form (`EN-us` → `en-US`).
    pub fn normalize_default_locale(&mut self) {
        let normalized = normalize(Some(&self.default_locale));
        if normalized.as_str() != self.default_locale {
            tracing::warn!(
                "defaultLocale '{}' is not normalized, using \"{}\"",
                self.default_locale,
                normalized
            );
            self.default_locale = normalized.into();
        }
    }

    /// # Errors
    /// - Required field is empty
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.default_locale.is_empty() {
            errors.push(ValidationError::new(
                "defaultLocale",
                "The locale cannot be empty. Please specify a locale, for example: \"en-US\"",
            ));
        }

        if self.resource_folder.is_empty() {
            errors.push(ValidationError::new(
                "resourceFolder",
                "The folder cannot be empty. Example: \"data/i18n\"",
            ));
        }

        if self.data_directory.is_empty() {
            errors.push(ValidationError::new(
                "dataDirectory",
                "The folder cannot be empty. Example: \"data\"",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for LocalizationSettings {
    fn default() -> Self {
        Self {
            default_locale: "en-US".to_string(),
            resource_folder: "data/i18n".to_string(),
            data_directory: "data".to_string(),
        }
    }
}

/// Persisted player configuration.
///
/// Only `language` is interpreted here; every other host setting is carried
/// through unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct PersistedConfig {
    /// Selected locale. Absent in saves written before localization existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(flatten)]
    pub host: Map<String, Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn validate_valid_settings() {
        let settings = LocalizationSettings::default();

        assert_that!(settings.validate(), ok(anything()));
    }

    #[rstest]
    fn deserialize_partial_settings() {
        let json = r#"{"defaultLocale": "ja-JP"}"#;

        let settings: LocalizationSettings = serde_json::from_str(json).unwrap();

        assert_that!(settings.default_locale, eq("ja-JP"));
        assert_that!(settings.resource_folder, eq("data/i18n"));
        assert_that!(settings.data_directory, eq("data"));
    }

    #[rstest]
    fn validate_invalid_default_locale_empty() {
        let settings = LocalizationSettings {
            default_locale: String::new(),
            ..LocalizationSettings::default()
        };
        let result = settings.validate();

        assert_that!(
            result,
            err(elements_are![all![
                field!(ValidationError.field_path, eq("defaultLocale")),
                field!(ValidationError.message, contains_substring("cannot be empty"))
            ]])
        );
    }

    #[rstest]
    #[case::mixed_case("EN-us", "en-US")]
    #[case::already_normalized("ja-JP", "ja-JP")]
    #[case::underscore("pt_br", "pt_BR")]
    fn normalize_default_locale_rewrites_in_place(#[case] input: &str, #[case] expected: &str) {
        let mut settings = LocalizationSettings {
            default_locale: input.to_string(),
            ..LocalizationSettings::default()
        };

        settings.normalize_default_locale();

        assert_that!(settings.default_locale, eq(expected));
        assert_that!(settings.validate(), ok(anything()));
    }

    #[rstest]
    fn config_error_validation_errors_format() {
        let settings = LocalizationSettings {
            resource_folder: String::new(),
            data_directory: String::new(),
            ..LocalizationSettings::default()
        };

        let errors = settings.validate().unwrap_err();
        let config_error = ConfigError::ValidationErrors(errors);

        let error_message = format!("{config_error}");
        assert_that!(error_message, contains_substring("Configuration validation failed"));
        assert_that!(error_message, contains_substring("1. resourceFolder"));
        assert_that!(error_message, contains_substring("2. dataDirectory"));
    }

    #[rstest]
    fn persisted_config_keeps_host_settings() {
        let text = r#"{"alwaysDash": true, "bgmVolume": 80, "language": "fr-FR"}"#;

        let config: PersistedConfig = serde_json::from_str(text).unwrap();

        assert_that!(config.language, some(eq("fr-FR")));
        assert_eq!(config.host.get("bgmVolume"), Some(&json!(80)));

        let round_trip = serde_json::to_value(&config).unwrap();
        assert_eq!(round_trip, json!({"alwaysDash": true, "bgmVolume": 80, "language": "fr-FR"}));
    }

    #[rstest]
    fn persisted_config_without_language() {
        let config: PersistedConfig = serde_json::from_str(r#"{"alwaysDash": false}"#).unwrap();

        assert_that!(config.language, none());
        assert_that!(config.host.len(), eq(1));
    }
}

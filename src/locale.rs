//! Locale code normalization.
//!
//! Locale codes are cache keys for translation bundles, so every user-supplied
//! or environment-detected tag goes through [`normalize`] first.

use std::fmt;

use serde::Serialize;

/// Language reported when the environment gives nothing usable.
const FALLBACK_SYSTEM_LANGUAGE: &str = "en-US";

/// Number of leading characters (language + separator) that are lowercased.
const LANGUAGE_PART_LEN: usize = 3;

/// A normalized locale code such as `en-US`.
///
/// Only [`normalize`] produces values of this type, so two codes compare equal
/// exactly when they address the same bundle file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LocaleCode(String);

impl LocaleCode {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the bundle file for this locale (`<code>.json`).
    #[must_use]
    pub fn bundle_file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl fmt::Display for LocaleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LocaleCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<LocaleCode> for String {
    fn from(code: LocaleCode) -> Self {
        code.0
    }
}

/// Language tag reported by the operating environment.
#[must_use]
pub fn system_language() -> String {
    sys_locale::get_locale().unwrap_or_else(|| {
        tracing::debug!("No system locale reported, using {}", FALLBACK_SYSTEM_LANGUAGE);
        FALLBACK_SYSTEM_LANGUAGE.to_string()
    })
}

/// Normalize a language tag into the `xx-XX` cache key form.
///
/// The first three characters are lowercased and the rest uppercased. Tags of
/// any other shape (`zh-Hant-TW`, `kok-IN`) are cased the same way without
/// complaint.
///
/// When `input` is `None` the environment language is used.
///
/// # Examples
/// ```
/// use game_i18n_overlay::locale::normalize;
///
/// assert_eq!(normalize(Some("en-us")).as_str(), "en-US");
/// assert_eq!(normalize(Some("FR_fr")).as_str(), "fr_FR");
/// ```
#[must_use]
pub fn normalize(input: Option<&str>) -> LocaleCode {
    match input {
        Some(tag) => normalize_tag(tag),
        None => normalize_tag(&system_language()),
    }
}

/// Case-fold a single tag by character position.
fn normalize_tag(tag: &str) -> LocaleCode {
    let mut code = String::with_capacity(tag.len());
    for (index, ch) in tag.chars().enumerate() {
        if index < LANGUAGE_PART_LEN {
            code.extend(ch.to_lowercase());
        } else {
            code.extend(ch.to_uppercase());
        }
    }
    LocaleCode(code)
}

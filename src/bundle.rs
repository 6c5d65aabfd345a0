//! Translation bundles and the process-wide bundle cache.

use std::collections::HashMap;
use std::sync::{
    Arc,
    PoisonError,
    RwLock,
};

use thiserror::Error;

use crate::fetch::{
    FetchError,
    ResourceFetcher,
    resource_path,
};
use crate::locale::LocaleCode;

/// Errors raised while loading a bundle.
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Failed to fetch bundle: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to parse bundle '{path}': {source}")]
    Parse {
        /// Resource path of the bundle
        path: String,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },
}

/// Flat mapping from original text to localized text for one locale.
///
/// Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceBundle {
    /// Original text → localized text
    entries: HashMap<String, String>,
}

impl ResourceBundle {
    #[must_use]
    pub const fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Parse a bundle from its JSON text.
    ///
    /// The document must be a flat object whose values are all strings.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<HashMap<String, String>>(text).map(Self::new)
    }

    /// Localized text for `original`.
    ///
    /// An empty localized string counts as untranslated.
    #[must_use]
    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str).filter(|text| !text.is_empty())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResourceBundle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Cache of loaded bundles keyed by locale.
///
/// Entries are inserted on the first successful load and are never evicted.
/// A failed load inserts nothing, so the next request for that locale fetches
/// again.
///
/// Loads for the same uncached locale are not deduplicated: each call issues
/// its own fetch and the last response to complete owns the slot.
#[derive(Debug)]
pub struct ResourceBundleCache {
    /// Transport used for bundle files
    fetcher: Arc<dyn ResourceFetcher>,
    /// Folder holding `<locale>.json` files
    resource_folder: String,
    /// Loaded bundles
    bundles: RwLock<HashMap<LocaleCode, Arc<ResourceBundle>>>,
}

impl ResourceBundleCache {
    #[must_use]
    pub fn new(fetcher: Arc<dyn ResourceFetcher>, resource_folder: impl Into<String>) -> Self {
        Self {
            fetcher,
            resource_folder: resource_folder.into(),
            bundles: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn resource_folder(&self) -> &str {
        &self.resource_folder
    }

    /// Resource path of the bundle file for `locale`.
    #[must_use]
    pub fn bundle_path(&self, locale: &LocaleCode) -> String {
        resource_path(&self.resource_folder, &locale.bundle_file_name())
    }

    /// Ensure the bundle for `locale` is loaded.
    ///
    /// Returns immediately without fetching when the bundle is already cached.
    pub async fn load(&self, locale: &LocaleCode) -> Result<Arc<ResourceBundle>, BundleError> {
        if let Some(bundle) = self.get(locale) {
            tracing::debug!(locale = %locale, "Bundle already cached");
            return Ok(bundle);
        }

        let path = self.bundle_path(locale);
        tracing::debug!(locale = %locale, path = %path, "Loading bundle");

        let text = self.fetcher.fetch(&path).await?;
        let bundle = ResourceBundle::from_json(&text)
            .map_err(|source| BundleError::Parse { path: path.clone(), source })?;
        let bundle = Arc::new(bundle);

        tracing::debug!(locale = %locale, entries = bundle.len(), "Bundle loaded");
        self.insert(locale.clone(), Arc::clone(&bundle));

        Ok(bundle)
    }

    /// Cached bundle for `locale`, if any.
    #[must_use]
    pub fn get(&self, locale: &LocaleCode) -> Option<Arc<ResourceBundle>> {
        self.bundles.read().unwrap_or_else(PoisonError::into_inner).get(locale).cloned()
    }

    #[must_use]
    pub fn contains(&self, locale: &LocaleCode) -> bool {
        self.bundles.read().unwrap_or_else(PoisonError::into_inner).contains_key(locale)
    }

    /// Store a bundle, replacing any earlier one for the same locale.
    pub fn insert(&self, locale: LocaleCode, bundle: Arc<ResourceBundle>) {
        self.bundles.write().unwrap_or_else(PoisonError::into_inner).insert(locale, bundle);
    }

    /// Look up `original` in the bundle cached for `locale`.
    #[must_use]
    pub fn lookup(&self, locale: &LocaleCode, original: &str) -> Option<String> {
        let bundles = self.bundles.read().unwrap_or_else(PoisonError::into_inner);
        bundles.get(locale).and_then(|bundle| bundle.get(original)).map(str::to_string)
    }

}

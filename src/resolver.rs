//! Active locale tracking.

use std::sync::{
    Arc,
    PoisonError,
    RwLock,
};

use crate::bundle::ResourceBundleCache;
use crate::locale::{
    LocaleCode,
    normalize,
};

/// Owns the active locale and switches it through the bundle cache.
///
/// A switch only commits the requested locale once its bundle is loaded. If
/// the load fails the configured default becomes active instead, whether or
/// not the default's own bundle is cached.
///
/// Switches are not sequenced against each other: when two switches overlap,
/// the one whose load completes last decides the active locale.
#[derive(Debug)]
pub struct LocaleResolver {
    /// Bundle cache shared with translation lookups
    cache: Arc<ResourceBundleCache>,
    /// Locale used when a switch fails
    default_locale: LocaleCode,
    /// Currently active locale
    active: RwLock<LocaleCode>,
}

impl LocaleResolver {
    /// Create a resolver whose active locale starts at `default_locale`.
    #[must_use]
    pub fn new(cache: Arc<ResourceBundleCache>, default_locale: LocaleCode) -> Self {
        let active = RwLock::new(default_locale.clone());
        Self { cache, default_locale, active }
    }

    #[must_use]
    pub const fn default_locale(&self) -> &LocaleCode {
        &self.default_locale
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<ResourceBundleCache> {
        &self.cache
    }

    #[must_use]
    pub fn active_locale(&self) -> LocaleCode {
        self.active.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Switch the active locale to `raw` (or the environment language).
    ///
    /// Never fails; returns the locale that ended up active.
    pub async fn set_active_locale(&self, raw: Option<&str>) -> LocaleCode {
        let requested = normalize(raw);
        tracing::debug!(requested = %requested, "Switching active locale");

        let next = match self.cache.load(&requested).await {
            Ok(_) => requested,
            Err(e) => {
                tracing::warn!(
                    requested = %requested,
                    fallback = %self.default_locale,
                    "Failed to load bundle, falling back to default locale: {}",
                    e
                );
                self.default_locale.clone()
            }
        };

        self.store(next.clone());
        next
    }

    /// Translation of `original` under the active locale, if the active
    /// locale's bundle is loaded and has one.
    #[must_use]
    pub fn translation(&self, original: &str) -> Option<String> {
        let active = self.active.read().unwrap_or_else(PoisonError::into_inner);
        self.cache.lookup(&active, original)
    }

    /// Translate `original`, falling back to the original text.
    #[must_use]
    pub fn translate(&self, original: &str) -> String {
        self.translation(original).unwrap_or_else(|| original.to_string())
    }

    /// Overwrite the active locale slot.
    fn store(&self, locale: LocaleCode) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = locale;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::fetch::ResourceFetcher;
    use crate::test_utils::StubFetcher;

    fn resolver_with(fetcher: &Arc<StubFetcher>) -> LocaleResolver {
        let fetcher: Arc<dyn ResourceFetcher> = Arc::<StubFetcher>::clone(fetcher);
        let cache = Arc::new(ResourceBundleCache::new(fetcher, "data/i18n"));
        LocaleResolver::new(cache, normalize(Some("en-US")))
    }

    fn stub_with_bundles() -> Arc<StubFetcher> {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.insert("data/i18n/fr-FR.json", r#"{"Hello": "Bonjour"}"#);
        fetcher.insert("data/i18n/de-DE.json", r#"{"Hello": "Hallo"}"#);
        fetcher
    }

    #[rstest]
    fn new_starts_at_default() {
        let resolver = resolver_with(&stub_with_bundles());

        assert_that!(resolver.active_locale().as_str(), eq("en-US"));
    }

    #[tokio::test]
    async fn set_active_locale_normalizes_and_commits() {
        let resolver = resolver_with(&stub_with_bundles());

        let active = resolver.set_active_locale(Some("FR-fr")).await;

        assert_eq!(active.as_str(), "fr-FR");
        assert_eq!(resolver.active_locale().as_str(), "fr-FR");
        assert_eq!(resolver.translate("Hello"), "Bonjour");
    }

    #[tokio::test]
    async fn set_active_locale_failure_falls_back_to_default() {
        let fetcher = stub_with_bundles();
        let resolver = resolver_with(&fetcher);
        resolver.set_active_locale(Some("fr-FR")).await;

        let active = resolver.set_active_locale(Some("xx-XX")).await;

        assert_eq!(active.as_str(), "en-US");
        assert_eq!(resolver.active_locale().as_str(), "en-US");
        assert!(!resolver.cache().contains(&normalize(Some("xx-XX"))));
        // The default's bundle is never fetched by the fallback.
        assert_eq!(fetcher.fetch_count("data/i18n/en-US.json"), 0);
    }

    #[tokio::test]
    async fn translate_without_bundle_returns_original() {
        let resolver = resolver_with(&stub_with_bundles());

        assert_eq!(resolver.translate("Hello"), "Hello");
        assert_eq!(resolver.translation("Hello"), None);
    }

    #[tokio::test]
    async fn switching_back_uses_cache() {
        let fetcher = stub_with_bundles();
        let resolver = resolver_with(&fetcher);

        resolver.set_active_locale(Some("fr-FR")).await;
        resolver.set_active_locale(Some("de-DE")).await;
        resolver.set_active_locale(Some("fr-FR")).await;

        assert_eq!(resolver.translate("Hello"), "Bonjour");
        assert_eq!(fetcher.fetch_count("data/i18n/fr-FR.json"), 1);
    }

    #[tokio::test]
    async fn overlapping_switches_last_completion_wins() {
        let fetcher = stub_with_bundles();
        fetcher.gate("data/i18n/fr-FR.json");
        let resolver = Arc::new(resolver_with(&fetcher));

        let slow = tokio::spawn({
            let resolver = Arc::clone(&resolver);
            async move { resolver.set_active_locale(Some("fr-FR")).await }
        });
        tokio::task::yield_now().await;
        resolver.set_active_locale(Some("de-DE")).await;
        assert_eq!(resolver.active_locale().as_str(), "de-DE");

        fetcher.release("data/i18n/fr-FR.json");
        slow.await.unwrap();

        // The older request completed last and owns the slot.
        assert_eq!(resolver.active_locale().as_str(), "fr-FR");
    }
}

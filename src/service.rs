//! Shared localization state.

use std::sync::Arc;

use crate::bundle::ResourceBundleCache;
use crate::fetch::ResourceFetcher;
use crate::locale::{
    LocaleCode,
    normalize,
};
use crate::resolver::LocaleResolver;

/// Handle to the bundle cache and active locale.
///
/// Cloning is cheap and every clone observes the same state. Overlaid data
/// resolves against whichever service it is read through.
#[derive(Debug, Clone)]
pub struct LocalizationService {
    /// Active locale and cache
    resolver: Arc<LocaleResolver>,
}

impl LocalizationService {
    /// Create a service with an empty cache and `default_locale` active.
    ///
    /// `default_locale` is normalized; `resource_folder` is the folder holding
    /// `<locale>.json` bundles, as understood by `fetcher`.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn ResourceFetcher>,
        resource_folder: impl Into<String>,
        default_locale: &str,
    ) -> Self {
        let cache = Arc::new(ResourceBundleCache::new(fetcher, resource_folder));
        let resolver = LocaleResolver::new(cache, normalize(Some(default_locale)));
        Self { resolver: Arc::new(resolver) }
    }

    #[must_use]
    pub fn resolver(&self) -> &LocaleResolver {
        &self.resolver
    }

    #[must_use]
    pub fn cache(&self) -> &ResourceBundleCache {
        self.resolver.cache()
    }

    #[must_use]
    pub fn active_locale(&self) -> LocaleCode {
        self.resolver.active_locale()
    }

    #[must_use]
    pub fn default_locale(&self) -> &LocaleCode {
        self.resolver.default_locale()
    }

    /// See [`LocaleResolver::set_active_locale`].
    pub async fn set_active_locale(&self, raw: Option<&str>) -> LocaleCode {
        self.resolver.set_active_locale(raw).await
    }

    /// Translate `original` under the active locale.
    #[must_use]
    pub fn translate(&self, original: &str) -> String {
        self.resolver.translate(original)
    }

    /// Translation of `original`, or `None` when no bundle entry applies.
    #[must_use]
    pub fn translation(&self, original: &str) -> Option<String> {
        self.resolver.translation(original)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::test_utils::StubFetcher;

    fn service_with(fetcher: &Arc<StubFetcher>) -> LocalizationService {
        let fetcher: Arc<dyn ResourceFetcher> = Arc::<StubFetcher>::clone(fetcher);
        LocalizationService::new(fetcher, "i18n", "EN-us")
    }

    #[rstest]
    fn new_normalizes_default_locale() {
        let service = service_with(&Arc::new(StubFetcher::new()));

        assert_that!(service.default_locale().as_str(), eq("en-US"));
        assert_that!(service.active_locale().as_str(), eq("en-US"));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.insert("i18n/ja-JP.json", r#"{"Hello": "こんにちは"}"#);
        let service = service_with(&fetcher);
        let other = service.clone();

        service.set_active_locale(Some("ja-jp")).await;

        assert_eq!(other.active_locale().as_str(), "ja-JP");
        assert_eq!(other.translate("Hello"), "こんにちは");
    }
}

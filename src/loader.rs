//! Named data file loading.
//!
//! [`DataLoader`] fetches `<data dir>/<src>`, parses it, runs it through the
//! configured [`DataTransform`] and publishes the result in a [`DataStore`].
//! Failures are recorded in the store's error slot for the host to report.

use std::collections::HashMap;
use std::fmt;
use std::sync::{
    Arc,
    PoisonError,
    RwLock,
};

use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::fetch::{
    FetchError,
    ResourceFetcher,
    resource_path,
};
use crate::overlay::{
    OverlayNode,
    overlay,
};

/// Errors raised while loading a data file.
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("Failed to fetch data file: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to parse data file '{path}': {source}")]
    Parse {
        /// Resource path of the data file
        path: String,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },
}

/// Step applied to every parsed data file before it is published.
pub trait DataTransform: Send + Sync + fmt::Debug {
    fn apply(&self, name: &str, document: Value) -> OverlayNode;
}

/// Overlays marked strings with translatable fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerOverlay;

impl DataTransform for MarkerOverlay {
    fn apply(&self, name: &str, document: Value) -> OverlayNode {
        let node = overlay(document);
        tracing::debug!(name = %name, fields = node.translatable_count(), "Overlaid data file");
        node
    }
}

/// Notified when a named dataset has been published.
pub trait ReadinessListener: Send + Sync + fmt::Debug {
    fn data_loaded(&self, name: &str);
}

/// Published datasets and the first load error.
#[derive(Debug, Default)]
pub struct DataStore {
    /// Dataset name → data; `None` while the load is in flight
    datasets: RwLock<HashMap<String, Option<OverlayNode>>>,
    /// First resource path that failed to load
    error_url: RwLock<Option<String>>,
}

impl DataStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as loading, discarding any earlier data.
    pub fn mark_pending(&self, name: &str) {
        self.datasets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), None);
    }

    pub fn publish(&self, name: &str, data: OverlayNode) {
        self.datasets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), Some(data));
    }

    /// Whether `name` has been published.
    #[must_use]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.datasets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .is_some_and(Option::is_some)
    }

    /// Whether every known dataset has been published.
    #[must_use]
    pub fn all_loaded(&self) -> bool {
        let datasets = self.datasets.read().unwrap_or_else(PoisonError::into_inner);
        datasets.values().all(Option::is_some)
    }

    /// Run `f` against the published data for `name`.
    pub fn with<R>(&self, name: &str, f: impl FnOnce(&OverlayNode) -> R) -> Option<R> {
        let datasets = self.datasets.read().unwrap_or_else(PoisonError::into_inner);
        datasets.get(name).and_then(Option::as_ref).map(f)
    }

    /// Run `f` against the published data for `name`, mutably.
    pub fn with_mut<R>(&self, name: &str, f: impl FnOnce(&mut OverlayNode) -> R) -> Option<R> {
        let mut datasets = self.datasets.write().unwrap_or_else(PoisonError::into_inner);
        datasets.get_mut(name).and_then(Option::as_mut).map(f)
    }

    /// Record a failed resource unless an earlier failure is already recorded.
    pub fn record_error(&self, url: &str) {
        let mut slot = self.error_url.write().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(url.to_string());
        }
    }

    #[must_use]
    pub fn error_url(&self) -> Option<String> {
        self.error_url.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Take the recorded failure, leaving the slot empty.
    pub fn take_error(&self) -> Option<String> {
        self.error_url.write().unwrap_or_else(PoisonError::into_inner).take()
    }
}

/// Loads named JSON data files into a [`DataStore`].
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Transport for data files
    fetcher: Arc<dyn ResourceFetcher>,
    /// Folder holding data files
    data_dir: String,
    /// Step applied after parsing
    transform: Arc<dyn DataTransform>,
    /// Where results are published
    store: Arc<DataStore>,
    /// Optional readiness notification
    listener: Option<Arc<dyn ReadinessListener>>,
}

impl DataLoader {
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn ResourceFetcher>,
        data_dir: impl Into<String>,
        transform: Arc<dyn DataTransform>,
    ) -> Self {
        Self {
            fetcher,
            data_dir: data_dir.into(),
            transform,
            store: Arc::new(DataStore::new()),
            listener: None,
        }
    }

    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn ReadinessListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    #[must_use]
    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    /// Load `src` and publish it as `name`.
    ///
    /// Never fails: errors are logged and the failing path is recorded in the
    /// store's error slot. There is no retry.
    pub async fn load_named(&self, name: &str, src: &str) {
        let path = resource_path(&self.data_dir, src);
        self.store.mark_pending(name);

        match self.fetch_document(&path).await {
            Ok(document) => {
                let data = self.transform.apply(name, document);
                self.store.publish(name, data);
                tracing::debug!(name = %name, path = %path, "Data file loaded");
                if let Some(listener) = &self.listener {
                    listener.data_loaded(name);
                }
            }
            Err(e) => {
                tracing::warn!(name = %name, path = %path, "Failed to load data file: {}", e);
                self.store.record_error(&path);
            }
        }
    }

    /// Start [`DataLoader::load_named`] in the background.
    pub fn spawn_load(&self, name: &str, src: &str) -> JoinHandle<()> {
        let loader = self.clone();
        let (name, src) = (name.to_string(), src.to_string());
        tokio::spawn(async move { loader.load_named(&name, &src).await })
    }

    /// Load every `(name, src)` pair concurrently.
    ///
    /// Returns once each file has been published or has failed.
    pub async fn load_all(&self, files: &[(&str, &str)]) {
        let loads = files.iter().map(|(name, src)| self.load_named(name, src));
        futures::future::join_all(loads).await;
    }

    /// Fetch and parse one data file.
    async fn fetch_document(&self, path: &str) -> Result<Value, DataLoadError> {
        let text = self.fetcher.fetch(path).await?;
        serde_json::from_str(&text)
            .map_err(|source| DataLoadError::Parse { path: path.to_string(), source })
    }
}

//! Asynchronous resource fetching.
//!
//! Bundles and data files are addressed by slash-separated resource paths
//! (`data/i18n/fr-FR.json`). A [`ResourceFetcher`] turns such a path into the
//! file's text.

use std::fmt;
use std::io;
use std::path::{
    Component,
    Path,
    PathBuf,
};

use futures::FutureExt;
use futures::future::BoxFuture;
use thiserror::Error;

/// Errors returned by a [`ResourceFetcher`].
#[derive(Error, Debug)]
pub enum FetchError {
    /// The resource does not exist.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Transport failure while reading the resource.
    #[error("Failed to read resource '{path}': {source}")]
    Io {
        /// Resource path that failed
        path: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The transport answered with a non-success status.
    #[error("Resource '{path}' returned status {status}")]
    Status {
        /// Resource path that failed
        path: String,
        /// Status code reported by the transport
        status: u16,
    },

    /// The path would resolve outside the fetcher's root.
    #[error("Resource path escapes the root: {0}")]
    OutsideRoot(String),
}

/// Source of bundle and data file contents.
///
/// Implementations must be cheap to call concurrently; every call is an
/// independent request with no deduplication.
pub trait ResourceFetcher: Send + Sync + fmt::Debug {
    /// Fetch the full text of the resource at `path`.
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, FetchError>>;
}

/// Fetches resources from the local filesystem, relative to a game root.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    /// Directory that resource paths are resolved against
    root: PathBuf,
}

impl FsFetcher {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a slash-separated resource path onto the filesystem.
    ///
    /// Returns `None` if any segment is not a plain name (`..`, a drive or
    /// root prefix), so the result always stays under `root`.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        path.split('/').filter(|part| !part.is_empty() && *part != ".").try_fold(
            self.root.clone(),
            |acc, part| {
                let mut components = Path::new(part).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => Some(acc.join(part)),
                    _ => None,
                }
            },
        )
    }
}

impl ResourceFetcher for FsFetcher {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        async move {
            let Some(file_path) = self.resolve(path) else {
                return Err(FetchError::OutsideRoot(path.to_string()));
            };
            tracing::debug!(path = %path, file = %file_path.display(), "Fetching resource");

            match tokio::fs::read_to_string(&file_path).await {
                Ok(text) => Ok(text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    Err(FetchError::NotFound(path.to_string()))
                }
                Err(source) => Err(FetchError::Io { path: path.to_string(), source }),
            }
        }
        .boxed()
    }
}

/// Join resource path segments with `/`, ignoring empty segments.
#[must_use]
pub fn resource_path(folder: &str, file: &str) -> String {
    let folder = folder.trim_end_matches('/');
    if folder.is_empty() { file.to_string() } else { format!("{folder}/{file}") }
}

//! Filesystem-backed fetch backend.
//!
//! Serves `file://` locators, decoding on the blocking pool and keeping
//! decoded images in a small LRU so repeated loads and prefetched locators
//! are answered from memory.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;
use tokio::task::JoinError;
use tracing::debug;

use crate::error::FetchError;
use crate::{Image, Locator};

use super::{CacheSource, FetchCollaborator, Fetched, Priority};

/// Default number of decoded images kept in memory.
pub const DEFAULT_IMAGE_CACHE_CAPACITY: usize = 64;

/// Interval between cache checks while settling prefetches.
const SETTLE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Fetch backend reading images from the local filesystem.
#[derive(Clone)]
pub struct FileFetcher {
    cache: Arc<Mutex<LruCache<Locator, Image>>>,
    capacity: usize,
}

impl FileFetcher {
    /// Create a fetcher with the default memory cache capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_IMAGE_CACHE_CAPACITY)
    }

    /// Create a fetcher keeping at most `capacity` decoded images.
    ///
    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
            capacity: capacity.get(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of images currently held in memory.
    pub async fn cache_len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn is_cached(&self, locator: &Locator) -> bool {
        self.cache.lock().await.contains(locator)
    }

    /// Wait until every locator in `locators` is cached, or until `within`
    /// has elapsed.
    ///
    /// Returns how many of `locators` are cached when it stops. Prefetches
    /// that fail never land in the cache, so a short count after the deadline
    /// means some locators could not be loaded.
    pub async fn settle(&self, locators: &[Locator], within: Duration) -> usize {
        let deadline = tokio::time::Instant::now() + within;
        loop {
            let cached = self.cached_count(locators).await;
            if cached == locators.len() || tokio::time::Instant::now() >= deadline {
                return cached;
            }
            tokio::time::sleep(SETTLE_POLL_INTERVAL).await;
        }
    }

    async fn cached_count(&self, locators: &[Locator]) -> usize {
        let cache = self.cache.lock().await;
        locators.iter().filter(|l| cache.contains(*l)).count()
    }
}

impl Default for FileFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchCollaborator for FileFetcher {
    async fn fetch(&self, locator: &Locator, priority: Priority) -> Result<Fetched, FetchError> {
        if let Some(image) = self.cache.lock().await.get(locator).cloned() {
            debug!(%locator, "Memory cache hit");
            return Ok(Fetched::loaded(image, CacheSource::Memory));
        }

        debug!(%locator, ?priority, "Loading image from disk");
        let fetched = load_file(locator).await?;

        if let Some(image) = &fetched.image {
            self.cache.lock().await.put(locator.clone(), image.clone());
        }

        Ok(fetched)
    }

    fn prefetch(&self, locators: &[Locator]) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                debug!(count = locators.len(), "No runtime available, skipping prefetch");
                return;
            }
        };

        for locator in locators.iter().cloned() {
            let cache = Arc::clone(&self.cache);
            handle.spawn(async move {
                if cache.lock().await.contains(&locator) {
                    return;
                }
                match load_file(&locator).await {
                    Ok(Fetched {
                        image: Some(image), ..
                    }) => {
                        cache.lock().await.put(locator, image);
                    }
                    Ok(_) => debug!(%locator, "Prefetch produced no image"),
                    Err(e) => debug!(%locator, error = %e, "Prefetch failed"),
                }
            });
        }
    }
}

/// Read and decode the file a `file://` locator points at.
async fn load_file(locator: &Locator) -> Result<Fetched, FetchError> {
    if locator.scheme() != "file" {
        return Err(FetchError::UnsupportedScheme(locator.scheme().to_string()));
    }

    let path = locator
        .to_file_path()
        .map_err(|_| FetchError::NotFound(locator.to_string()))?;

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(FetchError::NotFound(path.display().to_string()));
        }
        Err(e) => return Err(FetchError::Io(e.to_string())),
    };

    if bytes.is_empty() {
        return Ok(Fetched::empty());
    }

    let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(join_error_to_fetch)?
        .map_err(|e| FetchError::Decode(e.to_string()))?;

    Ok(Fetched::loaded(Arc::new(decoded), CacheSource::None))
}

/// Only an aborted task is a cancellation; a panic inside the decoder is a
/// decode failure for that file.
fn join_error_to_fetch(error: JoinError) -> FetchError {
    if error.is_cancelled() {
        FetchError::Cancelled
    } else {
        FetchError::Decode(format!("decoder panicked: {}", error))
    }
}

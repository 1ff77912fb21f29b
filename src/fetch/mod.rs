//! Fetch backend abstraction.
//!
//! The image service never touches the network, the disk or a cache itself.
//! It issues requests against a [`FetchCollaborator`], which owns all of that.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              ImageService               │
//! └────────────────────┬────────────────────┘
//!                      │ fetch / prefetch
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │        FetchCollaborator Trait          │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//!            ┌───────────────────┐
//!            │    FileFetcher    │
//!            │ (file:// + LRU)   │
//!            └───────────────────┘
//! ```

mod file;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::{Image, Locator};

pub use file::{FileFetcher, DEFAULT_IMAGE_CACHE_CAPACITY};

/// Scheduling hint passed along with a fetch.
///
/// Part of the collaborator contract: backends that queue work should serve
/// higher priorities first, and may ignore the hint otherwise. Variants are
/// ordered `Low < Default < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    /// Speculative work such as warming a cache ahead of use.
    Low,
    /// Requests with no particular urgency.
    #[default]
    Default,
    /// Loads a caller is actively waiting on. [`ImageService`] always
    /// fetches at this priority.
    ///
    /// [`ImageService`]: crate::service::ImageService
    High,
}

/// Where a fetched image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    /// Loaded from the underlying store
    None,
    /// Served from the in-memory cache
    Memory,
}

/// Result of a completed fetch.
///
/// `image` is `None` when the backend finished without producing an image.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub image: Option<Image>,
    pub source: CacheSource,
}

impl Fetched {
    pub fn loaded(image: Image, source: CacheSource) -> Self {
        Self {
            image: Some(image),
            source,
        }
    }

    pub fn empty() -> Self {
        Self {
            image: None,
            source: CacheSource::None,
        }
    }
}

/// Backend that actually fetches, decodes and caches images.
///
/// Implementations are shared process-wide and must be thread-safe.
#[async_trait]
pub trait FetchCollaborator: Send + Sync {
    /// Fetch a single image.
    async fn fetch(&self, locator: &Locator, priority: Priority) -> Result<Fetched, FetchError>;

    /// Warm the backend for a batch of locators.
    ///
    /// Must return without waiting for the work to complete and must not
    /// report failures.
    fn prefetch(&self, locators: &[Locator]);
}

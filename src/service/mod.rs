//! Image service layer.
//!
//! The service is a thin façade over a [`FetchCollaborator`]. It owns no cache
//! state of its own; it turns each request into an [`ImageFuture`] and forwards
//! prefetches.
//!
//! # Failure policy
//!
//! Every failure below the service (backend released, backend error, backend
//! finishing without an image) surfaces as [`ImageError::Generic`]. Callers
//! that know more context, such as the loading-state adapter, attach it
//! themselves. The dropped backend detail is logged at debug level.
//!
//! # Example
//!
//! ```ignore
//! use rx_image::fetch::FileFetcher;
//! use rx_image::service::{ImageService, ImageServing};
//!
//! let service = ImageService::new(FileFetcher::new());
//! let image = service.image(&locator).await?;
//! println!("{}x{}", image.width(), image.height());
//! ```

mod future;

use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::error::ImageError;
use crate::fetch::{FetchCollaborator, Fetched, FileFetcher, Priority};
use crate::Locator;

pub use future::ImageFuture;

/// Anything that can hand out images for locators.
pub trait ImageServing: Send + Sync {
    /// Request the image at `locator`.
    fn image(&self, locator: &Locator) -> ImageFuture;

    /// Warm the backend for a single locator.
    fn prefetch(&self, locator: &Locator) {
        self.prefetch_all(std::slice::from_ref(locator));
    }

    /// Warm the backend for a batch of locators. Never reports failures.
    fn prefetch_all(&self, locators: &[Locator]);
}

/// Shared handle to an image service.
pub type ImageServiceRef = Arc<dyn ImageServing>;

/// Default [`ImageServing`] implementation backed by a fetch collaborator.
pub struct ImageService<F: FetchCollaborator + 'static> {
    fetcher: Arc<F>,
}

impl<F: FetchCollaborator + 'static> ImageService<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
        }
    }

    /// Create a service over a backend that other components also use.
    pub fn with_shared_fetcher(fetcher: Arc<F>) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &Arc<F> {
        &self.fetcher
    }

    /// Wrap the service into a shareable [`ImageServiceRef`].
    pub fn into_ref(self) -> ImageServiceRef {
        Arc::new(self)
    }
}

impl<F: FetchCollaborator + 'static> ImageServing for ImageService<F> {
    fn image(&self, locator: &Locator) -> ImageFuture {
        let fetcher = Arc::downgrade(&self.fetcher);
        let locator = locator.clone();

        ImageFuture::new(async move {
            let Some(fetcher) = fetcher.upgrade() else {
                debug!(%locator, "Fetch backend released before the request could start");
                return Err(ImageError::Generic);
            };

            match fetcher.fetch(&locator, Priority::High).await {
                Ok(Fetched {
                    image: Some(image), ..
                }) => Ok(image),
                Ok(_) => {
                    debug!(%locator, "No image returned for locator");
                    Err(ImageError::Generic)
                }
                Err(e) => {
                    debug!(%locator, error = %e, "Could not retrieve image");
                    Err(ImageError::Generic)
                }
            }
        })
    }

    fn prefetch_all(&self, locators: &[Locator]) {
        debug!(count = locators.len(), "Prefetching images");
        self.fetcher.prefetch(locators);
    }
}

/// Process-wide default service over a [`FileFetcher`].
///
/// Built on first access; concurrent first callers all receive the same
/// instance.
pub fn shared_service() -> ImageServiceRef {
    static SHARED: OnceLock<ImageServiceRef> = OnceLock::new();
    SHARED
        .get_or_init(|| ImageService::new(FileFetcher::default()).into_ref())
        .clone()
}

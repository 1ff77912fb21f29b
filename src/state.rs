//! Loading-state streams for driving display targets.
//!
//! [`loading_state`] turns an image request into a progress stream:
//!
//! ```text
//!   no service ──► [Error(NoServiceAvailable)]
//!   no locator ──► [Error(NoLocator)]
//!   otherwise  ──► [Loading, Loaded(())]                  fetch succeeded
//!                  [Loading, Error(CouldNotLoad(locator))] fetch failed
//! ```
//!
//! On success the image is handed to the display target before `Loaded` is
//! emitted. The stream only holds a [`Weak`] reference to the target; if the
//! target is gone by then, the assignment is skipped and the state is still
//! emitted.

use std::sync::{Arc, Mutex, Weak};

use futures::future;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use tracing::{debug, warn};

use crate::error::ImageError;
use crate::loadable::LoadableResult;
use crate::service::ImageServiceRef;
use crate::subscription::{subscribe_stream, Subscription};
use crate::{Image, Locator};

/// Progress of a single load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadingState<T> {
    Loading,
    Loaded(T),
    Error(ImageError),
}

impl<T> LoadingState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading)
    }

    /// Whether no further state can follow this one.
    pub fn is_terminal(&self) -> bool {
        !self.is_loading()
    }

    pub fn map<U, F>(self, f: F) -> LoadingState<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            LoadingState::Loading => LoadingState::Loading,
            LoadingState::Loaded(value) => LoadingState::Loaded(f(value)),
            LoadingState::Error(error) => LoadingState::Error(error),
        }
    }
}

impl<T> From<LoadableResult<T>> for LoadingState<T> {
    fn from(result: LoadableResult<T>) -> Self {
        match result {
            LoadableResult::Loaded(value) => LoadingState::Loaded(value),
            LoadableResult::Error(error) => LoadingState::Error(error),
        }
    }
}

/// Something that can display an image.
pub trait ImageTarget: Send + Sync {
    fn set_image(&self, image: Image);
}

/// Build the loading-state stream for `locator`, assigning the image to
/// `target` on success.
///
/// The service is checked before the locator. Neither precondition failure
/// emits `Loading` or contacts the service.
pub fn loading_state<T>(
    target: Weak<T>,
    locator: Option<Locator>,
    service: Option<ImageServiceRef>,
) -> BoxStream<'static, LoadingState<()>>
where
    T: ImageTarget + ?Sized + 'static,
{
    let Some(service) = service else {
        return stream::once(future::ready(LoadingState::Error(
            ImageError::NoServiceAvailable,
        )))
        .boxed();
    };
    let Some(locator) = locator else {
        return stream::once(future::ready(LoadingState::Error(ImageError::NoLocator))).boxed();
    };

    let terminal = async move {
        match service.image(&locator).await {
            Ok(image) => {
                match target.upgrade() {
                    Some(target) => target.set_image(image),
                    None => debug!(%locator, "Display target released, skipping assignment"),
                }
                LoadingState::Loaded(())
            }
            Err(error) => {
                debug!(%locator, %error, "Image load failed");
                LoadingState::Error(ImageError::CouldNotLoad(locator))
            }
        }
    };

    stream::once(future::ready(LoadingState::Loading))
        .chain(stream::once(terminal))
        .boxed()
}

/// A minimal display target holding the most recently assigned image.
#[derive(Debug, Default)]
pub struct ImageView {
    image: Mutex<Option<Image>>,
}

impl ImageView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The currently displayed image.
    pub fn image(&self) -> Option<Image> {
        self.image
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn clear(&self) {
        *self
            .image
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    /// Load `locator` into this view in the background.
    ///
    /// Returns `None` without doing anything when no locator is given.
    /// Failures are logged, not reported.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn load(
        self: &Arc<Self>,
        locator: Option<Locator>,
        service: &ImageServiceRef,
    ) -> Option<Subscription> {
        let locator = locator?;
        let view = Arc::downgrade(self);
        let request = service.image(&locator);

        Some(request.subscribe(move |result| match result {
            Ok(image) => {
                if let Some(view) = view.upgrade() {
                    view.set_image(image);
                }
            }
            Err(error) => warn!(%locator, %error, "Could not load image asset"),
        }))
    }

    /// Load `locator` into this view, reporting progress as a stream.
    pub fn load_with_status(
        self: &Arc<Self>,
        locator: Option<Locator>,
        service: Option<ImageServiceRef>,
    ) -> BoxStream<'static, LoadingState<()>> {
        loading_state(Arc::downgrade(self), locator, service)
    }

    /// Load `locator` into this view in the background, calling `on_state`
    /// with each [`LoadingState`] as it is reached.
    ///
    /// Cancelling the returned subscription before the load resolves stops
    /// both the callbacks and the assignment.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn observe_status<F>(
        self: &Arc<Self>,
        locator: Option<Locator>,
        service: Option<ImageServiceRef>,
        on_state: F,
    ) -> Subscription
    where
        F: FnMut(LoadingState<()>) + Send + 'static,
    {
        subscribe_stream(self.load_with_status(locator, service), on_state)
    }
}

impl ImageTarget for ImageView {
    fn set_image(&self, image: Image) {
        *self
            .image
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(image);
    }
}

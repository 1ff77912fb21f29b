use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::ImageError;
use crate::subscription::{subscribe_future, Subscription};
use crate::Image;

/// A one-shot image request.
///
/// Resolves exactly once with either the image or an [`ImageError`]. Nothing
/// is fetched until the future is first polled, and dropping it releases the
/// request.
pub struct ImageFuture {
    inner: BoxFuture<'static, Result<Image, ImageError>>,
}

impl ImageFuture {
    pub fn new<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = Result<Image, ImageError>> + Send + 'static,
    {
        Self {
            inner: future.boxed(),
        }
    }

    /// Run the request in the background and deliver its outcome to
    /// `on_result`, unless the returned subscription is cancelled first.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn subscribe<F>(self, on_result: F) -> Subscription
    where
        F: FnOnce(Result<Image, ImageError>) + Send + 'static,
    {
        subscribe_future(self, on_result)
    }
}

impl Future for ImageFuture {
    type Output = Result<Image, ImageError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl std::fmt::Debug for ImageFuture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFuture").finish_non_exhaustive()
    }
}

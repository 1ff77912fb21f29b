use futures::future::{self, Either};
use futures::{stream, Stream, StreamExt};

use crate::service::{shared_service, ImageServiceRef};
use crate::{Image, Locator};

use super::{into_loadable_stream, LoadableResult};

/// Combinators over streams of [`LoadableResult`].
pub trait LoadableStreamExt<A>: Stream<Item = LoadableResult<A>> + Sized {
    /// Replace every `Loaded(a)` with the elements of `f(a)`.
    ///
    /// `Error` elements are forwarded as they are and `f` is not called for
    /// them. Inner streams are drained one after another, so the output keeps
    /// the order of the source.
    fn flat_map_loaded<B, S, F>(self, mut f: F) -> impl Stream<Item = LoadableResult<B>>
    where
        F: FnMut(A) -> S,
        S: Stream<Item = LoadableResult<B>>,
    {
        self.flat_map(move |element| match element {
            LoadableResult::Loaded(value) => Either::Left(f(value)),
            LoadableResult::Error(error) => {
                Either::Right(stream::once(future::ready(LoadableResult::Error(error))))
            }
        })
    }

    /// Transform the value of every `Loaded` element.
    fn map_loaded<B, F>(self, mut f: F) -> impl Stream<Item = LoadableResult<B>>
    where
        F: FnMut(A) -> B,
    {
        self.map(move |element| element.map(&mut f))
    }
}

impl<A, S> LoadableStreamExt<A> for S where S: Stream<Item = LoadableResult<A>> {}

/// Load the image at `locator` as a single-element loadable stream.
///
/// Falls back to the process-wide [`shared_service`] when no service is given.
pub fn locator_to_image_loadable(
    locator: &Locator,
    service: Option<ImageServiceRef>,
) -> impl Stream<Item = LoadableResult<Image>> + Send + 'static {
    let service = service.unwrap_or_else(shared_service);
    into_loadable_stream(service.image(locator))
}

/// Fetch an image for every `Loaded` locator in `locators`, passing errors
/// through without contacting the service.
pub fn stream_of_loadable_locators_to_images<S>(
    locators: S,
    service: Option<ImageServiceRef>,
) -> impl Stream<Item = LoadableResult<Image>>
where
    S: Stream<Item = LoadableResult<Locator>>,
{
    let service = service.unwrap_or_else(shared_service);
    locators.flat_map_loaded(move |locator| {
        locator_to_image_loadable(&locator, Some(service.clone()))
    })
}

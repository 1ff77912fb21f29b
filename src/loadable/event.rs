use std::future::Future;

use futures::{future, stream, Stream, StreamExt};

use crate::error::ImageError;

use super::LoadableResult;

/// A single signal from a materialized one-shot future.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<T> {
    /// The future produced a value
    Value(T),
    /// The future failed; nothing follows
    Failure(ImageError),
    /// The future finished after producing its value
    End,
}

impl<T> Event<T> {
    /// Fold the event into a loadable result. `End` carries no data and
    /// yields `None`.
    pub fn into_loadable(self) -> Option<LoadableResult<T>> {
        match self {
            Event::Value(value) => Some(LoadableResult::Loaded(value)),
            Event::Failure(error) => Some(LoadableResult::Error(error)),
            Event::End => None,
        }
    }
}

/// Express the outcome of `request` as events: `[Value, End]` on success,
/// `[Failure]` on error.
pub fn materialize<T, Fut>(request: Fut) -> impl Stream<Item = Event<T>>
where
    Fut: Future<Output = Result<T, ImageError>>,
{
    stream::once(request).flat_map(|outcome| {
        let events = match outcome {
            Ok(value) => vec![Event::Value(value), Event::End],
            Err(error) => vec![Event::Failure(error)],
        };
        stream::iter(events)
    })
}

/// Turn a one-shot future into a stream with exactly one `Loaded` or `Error`
/// element and no trailing completion element.
pub fn into_loadable_stream<T, Fut>(request: Fut) -> impl Stream<Item = LoadableResult<T>>
where
    Fut: Future<Output = Result<T, ImageError>>,
{
    materialize(request).filter_map(|event| future::ready(event.into_loadable()))
}

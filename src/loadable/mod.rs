//! Loadable results and the stream adapters built on them.
//!
//! A [`LoadableResult`] is the outcome of a finished load. Streams of them are
//! the currency of this module:
//!
//! - [`into_loadable_stream`] turns a one-shot future into a single-element
//!   stream, swallowing the completion signal
//! - [`LoadableStreamExt`] lifts functions over the `Loaded` elements of a
//!   stream while passing errors through untouched
//! - [`locator_to_image_loadable`] and [`stream_of_loadable_locators_to_images`]
//!   specialize the above to image requests

mod combinators;
mod event;

use crate::error::ImageError;

pub use combinators::{
    locator_to_image_loadable, stream_of_loadable_locators_to_images, LoadableStreamExt,
};
pub use event::{into_loadable_stream, materialize, Event};

/// Outcome of a completed load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadableResult<T> {
    Loaded(T),
    Error(ImageError),
}

impl<T> LoadableResult<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadableResult::Loaded(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadableResult::Error(_))
    }

    /// The loaded value, if any.
    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadableResult::Loaded(value) => Some(value),
            LoadableResult::Error(_) => None,
        }
    }

    /// The error, if any.
    pub fn error(&self) -> Option<&ImageError> {
        match self {
            LoadableResult::Loaded(_) => None,
            LoadableResult::Error(error) => Some(error),
        }
    }

    /// Transform the loaded value, keeping errors as they are.
    pub fn map<U, F>(self, f: F) -> LoadableResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            LoadableResult::Loaded(value) => LoadableResult::Loaded(f(value)),
            LoadableResult::Error(error) => LoadableResult::Error(error),
        }
    }

    pub fn into_result(self) -> Result<T, ImageError> {
        match self {
            LoadableResult::Loaded(value) => Ok(value),
            LoadableResult::Error(error) => Err(error),
        }
    }
}

impl<T> From<Result<T, ImageError>> for LoadableResult<T> {
    fn from(result: Result<T, ImageError>) -> Self {
        match result {
            Ok(value) => LoadableResult::Loaded(value),
            Err(error) => LoadableResult::Error(error),
        }
    }
}

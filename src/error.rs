use thiserror::Error;

use crate::Locator;

/// Errors reported by a fetch backend.
///
/// These never reach callers of the image service directly; the service
/// collapses them into [`ImageError::Generic`].
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Nothing exists at the locator
    #[error("Image not found: {0}")]
    NotFound(String),

    /// The backend cannot serve this kind of locator
    #[error("Unsupported locator scheme: {0}")]
    UnsupportedScheme(String),

    /// Reading the resource failed
    #[error("I/O error: {0}")]
    Io(String),

    /// The bytes could not be decoded into an image
    #[error("Decode error: {0}")]
    Decode(String),

    /// The request was abandoned before it completed
    #[error("Fetch cancelled")]
    Cancelled,
}

/// Failures produced by the image loading layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// Unspecified failure inside the image service
    #[error("Could not retrieve image")]
    Generic,

    /// Fetching failed for a known locator
    #[error("Could not load image from {0}")]
    CouldNotLoad(Locator),

    /// The caller did not supply a locator
    #[error("No image locator supplied")]
    NoLocator,

    /// The caller did not supply an image service
    #[error("No image service available")]
    NoServiceAvailable,
}

impl ImageError {
    /// The locator attached to this error, if any.
    pub fn locator(&self) -> Option<&Locator> {
        match self {
            ImageError::CouldNotLoad(locator) => Some(locator),
            _ => None,
        }
    }
}

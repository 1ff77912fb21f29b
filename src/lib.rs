//! # rx-image
//!
//! Reactive image loading on top of a pluggable fetch backend.
//!
//! Given a locator (URL), the crate produces a single asynchronous outcome,
//! a decoded image or a typed error, and exposes it in three shapes:
//!
//! - a cancellable one-shot future ([`ImageFuture`])
//! - a loading-state stream (`Loading → Loaded | Error`) for driving display
//!   targets ([`loading_state`])
//! - loadable-result streams with combinators that only act on successful
//!   elements ([`LoadableStreamExt`])
//!
//! Fetching, decoding and caching live behind the [`FetchCollaborator`]
//! trait. [`FileFetcher`] is the bundled backend for `file://` locators.
//!
//! ## Architecture
//!
//! - [`fetch`] - Fetch backend trait and the filesystem backend
//! - [`service`] - Image service façade and the one-shot [`ImageFuture`]
//! - [`loadable`] - Loadable results, materialization and stream combinators
//! - [`state`] - Loading-state streams and display targets
//! - [`subscription`] - Cancellation handles for background subscriptions
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use rx_image::{FileFetcher, ImageService, ImageView, Locator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = ImageService::new(FileFetcher::new()).into_ref();
//!     let view = ImageView::new();
//!     let locator = Locator::parse("file:///tmp/photo.png").ok();
//!
//!     let mut states = view.load_with_status(locator, Some(service));
//!     while let Some(state) = states.next().await {
//!         println!("{:?}", state);
//!     }
//! }
//! ```

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod fetch;
pub mod loadable;
pub mod service;
pub mod state;
pub mod subscription;

/// Identifier of an image resource.
pub type Locator = url::Url;

/// A decoded image, shared between whoever currently holds it.
pub type Image = Arc<image::DynamicImage>;

// Re-export commonly used types
pub use config::{Cli, Command, FetcherConfig, LoadConfig, OutputFormat, PrefetchConfig};
pub use error::{FetchError, ImageError};
pub use fetch::{
    CacheSource, FetchCollaborator, Fetched, FileFetcher, Priority, DEFAULT_IMAGE_CACHE_CAPACITY,
};
pub use loadable::{
    into_loadable_stream, locator_to_image_loadable, materialize,
    stream_of_loadable_locators_to_images, Event, LoadableResult, LoadableStreamExt,
};
pub use service::{shared_service, ImageFuture, ImageService, ImageServiceRef, ImageServing};
pub use state::{loading_state, ImageTarget, ImageView, LoadingState};
pub use subscription::{subscribe_future, subscribe_stream, Subscription};

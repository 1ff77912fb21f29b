//! Cancellation handles for spawned subscriptions.
//!
//! Every subscribe-style operation in this crate hands back a [`Subscription`].
//! Cancelling it stops the spawned task at its next await point and, if the
//! work already finished, keeps the callback from running.

use std::future::Future;

use futures::future::{AbortHandle, Abortable};
use futures::{Stream, StreamExt};
use tracing::debug;

/// Handle to a running subscription.
///
/// Dropping the handle does not cancel the subscription; call
/// [`Subscription::cancel`] for that.
#[derive(Debug, Clone)]
pub struct Subscription {
    handle: AbortHandle,
}

impl Subscription {
    /// Stop the subscription. Calling this more than once, or after the
    /// subscription finished, is a no-op.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_aborted()
    }
}

/// Drive `future` on the current tokio runtime and hand its output to
/// `on_output` unless the subscription was cancelled first.
///
/// # Panics
///
/// Panics when called outside a tokio runtime.
pub fn subscribe_future<Fut, F>(future: Fut, on_output: F) -> Subscription
where
    Fut: Future + Send + 'static,
    Fut::Output: Send,
    F: FnOnce(Fut::Output) + Send + 'static,
{
    let (handle, registration) = AbortHandle::new_pair();
    let guard = handle.clone();

    tokio::spawn(Abortable::new(
        async move {
            let output = future.await;
            if guard.is_aborted() {
                debug!("Subscription cancelled, dropping result");
                return;
            }
            on_output(output);
        },
        registration,
    ));

    Subscription { handle }
}

/// Drive `stream` on the current tokio runtime, calling `on_item` for each
/// element until the stream ends or the subscription is cancelled.
///
/// # Panics
///
/// Panics when called outside a tokio runtime.
pub fn subscribe_stream<S, F>(stream: S, mut on_item: F) -> Subscription
where
    S: Stream + Send + 'static,
    S::Item: Send,
    F: FnMut(S::Item) + Send + 'static,
{
    let (handle, registration) = AbortHandle::new_pair();
    let guard = handle.clone();

    tokio::spawn(Abortable::new(
        async move {
            futures::pin_mut!(stream);
            while let Some(item) = stream.next().await {
                if guard.is_aborted() {
                    debug!("Subscription cancelled, dropping remaining items");
                    return;
                }
                on_item(item);
            }
        },
        registration,
    ));

    Subscription { handle }
}

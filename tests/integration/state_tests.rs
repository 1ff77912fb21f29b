//! Loading-state stream integration tests.
//!
//! Tests verify:
//! - Precondition failures emit a single error and never contact the backend
//! - Successful loads emit `Loading` then `Loaded`, assigning the image first
//! - Failed loads carry the locator in the error
//! - Released targets and dropped streams are handled quietly

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use futures::StreamExt;

use rx_image::{loading_state, ImageError, ImageTarget, ImageView, LoadingState};

use super::test_utils::{locator, service_with, MockFetcher, RecordingTarget};

// =============================================================================
// Preconditions
// =============================================================================

#[tokio::test]
async fn test_missing_locator_emits_only_error() {
    let (service, fetcher) = service_with(MockFetcher::new());
    let view = ImageView::new();

    let states: Vec<_> = view.load_with_status(None, Some(service)).collect().await;

    assert_eq!(states, vec![LoadingState::Error(ImageError::NoLocator)]);
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn test_missing_service_emits_only_error() {
    let view = ImageView::new();

    let states: Vec<_> = view
        .load_with_status(Some(locator("a.png")), None)
        .collect()
        .await;

    assert_eq!(
        states,
        vec![LoadingState::Error(ImageError::NoServiceAvailable)]
    );
    assert!(view.image().is_none());
}

// =============================================================================
// Sequencing
// =============================================================================

#[tokio::test]
async fn test_success_emits_loading_then_loaded() {
    let (service, fetcher) = service_with(MockFetcher::new().with_image("a.png", 3, 3));
    let log = Arc::new(Mutex::new(Vec::new()));
    let target = RecordingTarget::new(Arc::clone(&log));

    let mut states = loading_state(
        Arc::downgrade(&target),
        Some(locator("a.png")),
        Some(service),
    );

    let mut received = Vec::new();
    while let Some(state) = states.next().await {
        log.lock().unwrap().push(format!("{:?}", state));
        received.push(state);
    }

    assert_eq!(received, vec![LoadingState::Loading, LoadingState::Loaded(())]);
    assert_eq!(target.assignments(), 1);
    assert_eq!(target.last().unwrap().width(), 3);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["Loading", "assigned", "Loaded(())"]
    );
    assert_eq!(fetcher.fetch_count(), 1);
}

#[tokio::test]
async fn test_failure_emits_could_not_load_with_locator() {
    let (service, _fetcher) = service_with(MockFetcher::new().with_failure("broken.png"));
    let view = ImageView::new();

    let states: Vec<_> = view
        .load_with_status(Some(locator("broken.png")), Some(service))
        .collect()
        .await;

    assert_eq!(
        states,
        vec![
            LoadingState::Loading,
            LoadingState::Error(ImageError::CouldNotLoad(locator("broken.png"))),
        ]
    );
    assert!(view.image().is_none());
}

#[tokio::test]
async fn test_loading_emitted_before_fetch_resolves() {
    let (service, fetcher) = service_with(MockFetcher::new().with_image("a.png", 1, 1).gated());
    let view = ImageView::new();

    let mut states = view.load_with_status(Some(locator("a.png")), Some(service));

    assert_eq!(states.next().await, Some(LoadingState::Loading));
    let pending = tokio::time::timeout(Duration::from_millis(20), states.next()).await;
    assert!(pending.is_err());

    fetcher.open_gate();
    assert_eq!(states.next().await, Some(LoadingState::Loaded(())));
    assert_eq!(states.next().await, None);
    assert!(view.image().is_some());
}

#[tokio::test]
async fn test_observe_status_delivers_states_in_order() {
    let (service, _fetcher) = service_with(MockFetcher::new().with_image("a.png", 5, 4));
    let view = ImageView::new();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let _subscription = view.observe_status(Some(locator("a.png")), Some(service), move |state| {
        let _ = tx.send(state);
    });

    let mut states = Vec::new();
    while let Some(state) = rx.recv().await {
        states.push(state);
    }

    assert_eq!(states, vec![LoadingState::Loading, LoadingState::Loaded(())]);
    assert_eq!(view.image().unwrap().width(), 5);
}

#[tokio::test]
async fn test_observe_status_without_service_reports_error() {
    let view = ImageView::new();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let _subscription = view.observe_status(Some(locator("a.png")), None, move |state| {
        let _ = tx.send(state);
    });

    assert_eq!(
        rx.recv().await,
        Some(LoadingState::Error(ImageError::NoServiceAvailable))
    );
    assert_eq!(rx.recv().await, None);
}

// =============================================================================
// Target Lifetime and Cancellation
// =============================================================================

#[tokio::test]
async fn test_released_target_still_reports_loaded() {
    let (service, _fetcher) = service_with(MockFetcher::new().with_image("a.png", 1, 1));
    let log = Arc::new(Mutex::new(Vec::new()));
    let target = RecordingTarget::new(Arc::clone(&log));
    let weak: Weak<RecordingTarget> = Arc::downgrade(&target);
    drop(target);

    let states: Vec<_> = loading_state(weak, Some(locator("a.png")), Some(service))
        .collect()
        .await;

    assert_eq!(states, vec![LoadingState::Loading, LoadingState::Loaded(())]);
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_dropped_stream_never_assigns() {
    let (service, fetcher) = service_with(MockFetcher::new().with_image("a.png", 1, 1).gated());
    let log = Arc::new(Mutex::new(Vec::new()));
    let target = RecordingTarget::new(Arc::clone(&log));

    let mut states = loading_state(
        Arc::downgrade(&target),
        Some(locator("a.png")),
        Some(service),
    );
    assert_eq!(states.next().await, Some(LoadingState::Loading));
    let _ = tokio::time::timeout(Duration::from_millis(10), states.next()).await;
    drop(states);

    fetcher.open_gate();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(target.assignments(), 0);
    assert_eq!(fetcher.fetch_count(), 1);
}

#[tokio::test]
async fn test_trait_object_target() {
    let (service, _fetcher) = service_with(MockFetcher::new().with_image("a.png", 2, 2));
    let view = ImageView::new();
    let target: Arc<dyn ImageTarget> = view.clone();

    let states: Vec<_> = loading_state(
        Arc::downgrade(&target),
        Some(locator("a.png")),
        Some(service),
    )
    .collect()
    .await;

    assert_eq!(states.last(), Some(&LoadingState::Loaded(())));
    assert_eq!(view.image().unwrap().width(), 2);
}

#[tokio::test]
async fn test_cancelled_observe_status_stops_before_terminal_state() {
    let (service, fetcher) = service_with(MockFetcher::new().with_image("a.png", 1, 1).gated());
    let view = ImageView::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let subscription = view.observe_status(Some(locator("a.png")), Some(service), move |state| {
        sink.lock().unwrap().push(state);
    });

    fetcher.wait_for_fetch().await;
    subscription.cancel();
    fetcher.open_gate();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(subscription.is_cancelled());
    assert_eq!(*seen.lock().unwrap(), vec![LoadingState::Loading]);
    assert!(view.image().is_none());
}

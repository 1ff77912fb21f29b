//! Image service integration tests.
//!
//! Tests verify:
//! - Each request resolves to exactly one outcome
//! - Backend failures collapse to the generic error
//! - Cancelled subscriptions never deliver results
//! - Prefetch is forwarded and never fails
//! - The shared service is a singleton under concurrent access

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::oneshot;

use rx_image::{shared_service, ImageError, ImageView};

use super::test_utils::{locator, service_with, MockFetcher};

// =============================================================================
// One-shot Requests
// =============================================================================

#[tokio::test]
async fn test_image_resolves_with_decoded_image() {
    let (service, fetcher) = service_with(MockFetcher::new().with_image("a.png", 8, 6));

    let image = service.image(&locator("a.png")).await.unwrap();

    assert_eq!((image.width(), image.height()), (8, 6));
    assert_eq!(fetcher.fetch_count(), 1);
    assert_eq!(fetcher.fetched(), vec![locator("a.png")]);
}

#[tokio::test]
async fn test_failures_collapse_to_generic() {
    let (service, _fetcher) = service_with(
        MockFetcher::new()
            .with_failure("broken.png")
            .with_empty("empty.png"),
    );

    for name in ["broken.png", "empty.png", "unscripted.png"] {
        let result = service.image(&locator(name)).await;
        assert_eq!(result.unwrap_err(), ImageError::Generic, "for {}", name);
    }
}

#[tokio::test]
async fn test_subscription_delivers_exactly_once() {
    let (service, _fetcher) = service_with(MockFetcher::new().with_image("a.png", 1, 1));
    let deliveries = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = oneshot::channel();

    let counter = Arc::clone(&deliveries);
    service.image(&locator("a.png")).subscribe(move |result| {
        counter.fetch_add(1, Ordering::SeqCst);
        let _ = tx.send(result.is_ok());
    });

    assert!(rx.await.unwrap());
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(deliveries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_independent_requests_run_concurrently() {
    let (service, fetcher) = service_with(
        MockFetcher::new()
            .with_image("a.png", 1, 1)
            .with_image("b.png", 2, 2)
            .with_failure("c.png"),
    );

    let results = join_all(
        ["a.png", "b.png", "c.png"]
            .iter()
            .map(|name| service.image(&locator(name))),
    )
    .await;

    assert!(results[0].is_ok());
    assert_eq!(results[1].as_ref().unwrap().width(), 2);
    assert_eq!(results[2].as_ref().unwrap_err(), &ImageError::Generic);
    assert_eq!(fetcher.fetch_count(), 3);
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_cancelled_subscription_drops_result() {
    let (service, fetcher) = service_with(MockFetcher::new().with_image("a.png", 1, 1).gated());
    let delivered = Arc::new(Mutex::new(None));

    let slot = Arc::clone(&delivered);
    let subscription = service.image(&locator("a.png")).subscribe(move |result| {
        *slot.lock().unwrap() = Some(result.is_ok());
    });

    fetcher.wait_for_fetch().await;
    subscription.cancel();
    fetcher.open_gate();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(subscription.is_cancelled());
    assert!(delivered.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_cancelled_view_load_skips_assignment() {
    let (service, fetcher) = service_with(MockFetcher::new().with_image("a.png", 4, 4).gated());
    let view = ImageView::new();

    let subscription = view
        .load(Some(locator("a.png")), &service)
        .expect("locator was supplied");

    fetcher.wait_for_fetch().await;
    subscription.cancel();
    fetcher.open_gate();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(view.image().is_none());
}

#[tokio::test]
async fn test_dropping_pending_future_is_quiet() {
    let (service, fetcher) = service_with(MockFetcher::new().with_image("a.png", 1, 1).gated());

    let request = service.image(&locator("a.png"));
    let pending = tokio::time::timeout(Duration::from_millis(20), request).await;
    assert!(pending.is_err());

    fetcher.open_gate();
    assert_eq!(fetcher.fetch_count(), 1);
}

// =============================================================================
// View Loading
// =============================================================================

#[tokio::test]
async fn test_view_load_assigns_image() {
    let (service, _fetcher) = service_with(MockFetcher::new().with_image("a.png", 5, 7));
    let view = ImageView::new();

    view.load(Some(locator("a.png")), &service).unwrap();

    for _ in 0..100 {
        if view.image().is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(view.image().unwrap().height(), 7);
}

#[tokio::test]
async fn test_view_load_without_locator_does_nothing() {
    let (service, fetcher) = service_with(MockFetcher::new());
    let view = ImageView::new();

    assert!(view.load(None, &service).is_none());
    assert_eq!(fetcher.fetch_count(), 0);
}

// =============================================================================
// Prefetch and Singleton
// =============================================================================

#[tokio::test]
async fn test_prefetch_forwards_locators() {
    let (service, fetcher) = service_with(MockFetcher::new());

    service.prefetch(&locator("a.png"));
    service.prefetch_all(&[locator("b.png"), locator("c.png")]);

    assert_eq!(
        fetcher.prefetched(),
        vec![locator("a.png"), locator("b.png"), locator("c.png")]
    );
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_service_same_instance_across_tasks() {
    let handles: Vec<_> = (0..16)
        .map(|_| {
            tokio::spawn(async { Arc::as_ptr(&shared_service()) as *const () as usize })
        })
        .collect();

    let mut addresses = Vec::new();
    for handle in handles {
        addresses.push(handle.await.unwrap());
    }

    assert!(addresses.iter().all(|a| *a == addresses[0]));
}

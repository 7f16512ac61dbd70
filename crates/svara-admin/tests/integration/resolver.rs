//! Signed-image resolver against the in-memory bucket.

use std::sync::Arc;
use std::time::Duration;

use svara_admin::{ImageState, SignedImageResolver, SignedUrlCache, UnavailableReason};
use svara_core::memory::{Call, Operation};

use crate::common::TestHarness;

fn harness_with_photo() -> TestHarness {
    let h = TestHarness::new();
    h.backend.put_object("cars/1-a.jpg", vec![1], "image/jpeg");
    h
}

#[tokio::test]
async fn test_mount_loads_then_ready() {
    let h = harness_with_photo();
    let resolver = h.resolver();

    let mut handle = resolver.mount("cars/1-a.jpg");
    assert!(handle.state().is_loading());
    assert!(handle.state().url().is_none());

    let state = handle.load(&resolver).await.clone();
    assert!(!state.is_unavailable());
    assert!(state.url().unwrap().contains("cars/1-a.jpg?token="));
    assert_eq!(h.backend.calls(), vec![Call::Sign("cars/1-a.jpg".to_string())]);
}

#[tokio::test]
async fn test_missing_object_is_unavailable() {
    let h = TestHarness::new();
    let resolver = h.resolver();
    let mut handle = resolver.mount("cars/gone.jpg");
    assert_eq!(
        handle.load(&resolver).await,
        &ImageState::Unavailable(UnavailableReason::NotFound)
    );
}

#[tokio::test]
async fn test_sign_failure_is_unavailable() {
    let h = harness_with_photo();
    h.backend.fail(Operation::Sign);
    let state = h.resolver().resolve("cars/1-a.jpg").await;
    assert!(matches!(
        state,
        ImageState::Unavailable(UnavailableReason::RequestFailed(_))
    ));
}

#[tokio::test]
async fn test_empty_reference_sends_nothing() {
    let h = TestHarness::new();
    let state = h.resolver().resolve("  ").await;
    assert_eq!(state, ImageState::Unavailable(UnavailableReason::NoImage));
    assert!(h.backend.calls().is_empty());
}

#[tokio::test]
async fn test_legacy_url_is_reduced_to_key() {
    let h = harness_with_photo();
    let state = h
        .resolver()
        .resolve("https://abc.supabase.co/storage/v1/object/public/cars/1-a.jpg")
        .await;
    assert!(state.url().is_some());
    assert_eq!(h.backend.calls(), vec![Call::Sign("cars/1-a.jpg".to_string())]);
}

#[tokio::test]
async fn test_every_mount_signs_again() {
    let h = harness_with_photo();
    let resolver = h.resolver();
    for _ in 0..2 {
        let mut handle = resolver.mount("cars/1-a.jpg");
        handle.load(&resolver).await;
    }
    assert_eq!(h.backend.call_count(Operation::Sign), 2);
}

#[tokio::test]
async fn test_cache_reuses_fresh_urls() {
    let h = harness_with_photo();
    let resolver = SignedImageResolver::new(h.backend.clone())
        .with_cache(Arc::new(SignedUrlCache::default()));

    let first = resolver.resolve("cars/1-a.jpg").await;
    let second = resolver.resolve("cars/1-a.jpg").await;
    assert_eq!(first, second);
    assert_eq!(h.backend.call_count(Operation::Sign), 1);
}

#[tokio::test]
async fn test_cache_ignores_short_lived_urls() {
    let h = harness_with_photo();
    let resolver = SignedImageResolver::new(h.backend.clone())
        .with_ttl(Duration::from_secs(30))
        .with_cache(Arc::new(SignedUrlCache::default()));

    resolver.resolve("cars/1-a.jpg").await;
    resolver.resolve("cars/1-a.jpg").await;
    assert_eq!(h.backend.call_count(Operation::Sign), 2);
}

#[tokio::test]
async fn test_load_failure_drops_cached_url() {
    let h = harness_with_photo();
    let resolver = SignedImageResolver::new(h.backend.clone())
        .with_cache(Arc::new(SignedUrlCache::default()));

    let mut broken = resolver.mount("cars/1-a.jpg");
    broken.load(&resolver).await;
    assert!(broken.image_failed(&resolver, "HTTP 403"));

    let mut retry = resolver.mount("cars/1-a.jpg");
    assert!(retry.load(&resolver).await.url().is_some());
    assert_eq!(h.backend.call_count(Operation::Sign), 2);
}

#[tokio::test]
async fn test_load_failure_after_ready() {
    let h = harness_with_photo();
    let resolver = h.resolver();
    let mut handle = resolver.mount("cars/1-a.jpg");

    assert!(!handle.image_failed(&resolver, "too early"));
    handle.load(&resolver).await;
    assert!(handle.image_failed(&resolver, "decode error"));
    assert_eq!(
        handle.state(),
        &ImageState::Unavailable(UnavailableReason::LoadFailed("decode error".to_string()))
    );
    assert!(!handle.image_failed(&resolver, "again"));

    // A settled handle does not request again.
    handle.load(&resolver).await;
    assert_eq!(h.backend.call_count(Operation::Sign), 1);
}

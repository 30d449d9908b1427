//! Tests for `WebhookResolver`.

use std::sync::Arc;

use super::test_fixtures::CountingLookup;
use super::{ResolveError, WebhookResolver};
use crate::lookup::{ConfiguredLookup, LookupError, StaticLookup};

#[tokio::test]
async fn first_call_looks_up_and_caches() {
    let lookup = Arc::new(CountingLookup::ok("https://hooks.example.com/a"));
    let resolver = WebhookResolver::new(Arc::clone(&lookup));

    assert!(resolver.cached().is_none());
    assert_eq!(resolver.resolve().await.unwrap(), "https://hooks.example.com/a");
    assert_eq!(resolver.resolve().await.unwrap(), "https://hooks.example.com/a");

    assert_eq!(lookup.calls(), 1);
    assert_eq!(resolver.cached().as_deref(), Some("https://hooks.example.com/a"));
}

#[tokio::test]
async fn value_is_trimmed() {
    let resolver = WebhookResolver::new(StaticLookup::new("  https://hooks.example.com/a\n"));

    assert_eq!(resolver.resolve().await.unwrap(), "https://hooks.example.com/a");
}

#[tokio::test]
async fn blank_value_is_an_error_and_not_cached() {
    let resolver = WebhookResolver::new(StaticLookup::new("   "));

    let err = resolver.resolve().await.unwrap_err();

    assert!(matches!(err, ResolveError::Empty));
    assert!(resolver.cached().is_none());
    assert!(!resolver.is_resolving());
}

#[tokio::test]
async fn unconfigured_lookup_fails() {
    let resolver = WebhookResolver::new(ConfiguredLookup::Unconfigured);

    let err = resolver.resolve().await.unwrap_err();

    assert!(matches!(err, ResolveError::Lookup(ref e) if matches!(**e, LookupError::NotConfigured)));
}

#[tokio::test]
async fn concurrent_callers_share_one_lookup() {
    let lookup = Arc::new(CountingLookup::ok("https://hooks.example.com/a"));
    let resolver = WebhookResolver::new(Arc::clone(&lookup));

    let (a, b, c) = tokio::join!(resolver.resolve(), resolver.resolve(), resolver.resolve());

    assert_eq!(a.unwrap(), "https://hooks.example.com/a");
    assert_eq!(b.unwrap(), "https://hooks.example.com/a");
    assert_eq!(c.unwrap(), "https://hooks.example.com/a");
    assert_eq!(lookup.calls(), 1);
}

#[tokio::test]
async fn concurrent_callers_share_one_failure() {
    let lookup = Arc::new(CountingLookup::failing());
    let resolver = WebhookResolver::new(Arc::clone(&lookup));

    let (a, b) = tokio::join!(resolver.resolve(), resolver.resolve());

    assert!(matches!(a, Err(ResolveError::Lookup(_))));
    assert!(matches!(b, Err(ResolveError::Lookup(_))));
    assert_eq!(lookup.calls(), 1);
}

#[tokio::test]
async fn failure_is_not_cached() {
    let lookup = Arc::new(CountingLookup::failing());
    let resolver = WebhookResolver::new(Arc::clone(&lookup));

    assert!(resolver.resolve().await.is_err());
    assert!(resolver.resolve().await.is_err());

    assert_eq!(lookup.calls(), 2);
    assert!(!resolver.is_resolving());
}

#[tokio::test]
async fn reset_forces_a_new_lookup() {
    let lookup = Arc::new(CountingLookup::ok("https://hooks.example.com/a"));
    let resolver = WebhookResolver::new(Arc::clone(&lookup));

    resolver.resolve().await.unwrap();
    resolver.reset();
    resolver.reset();

    assert!(resolver.cached().is_none());
    resolver.resolve().await.unwrap();
    assert_eq!(lookup.calls(), 2);
}

#[tokio::test]
async fn dropped_leader_does_not_wedge_the_resolver() {
    let lookup = Arc::new(CountingLookup::ok("https://hooks.example.com/a"));
    let resolver = WebhookResolver::new(Arc::clone(&lookup));

    {
        let mut pending = Box::pin(resolver.resolve());
        // Drive the leader into its lookup, then abandon it.
        assert!(futures_poll_once(pending.as_mut()).await.is_none());
        assert!(resolver.is_resolving());
    }

    assert!(!resolver.is_resolving());
    assert_eq!(resolver.resolve().await.unwrap(), "https://hooks.example.com/a");
    assert_eq!(lookup.calls(), 2);
}

/// Polls a future exactly once.
async fn futures_poll_once<F: std::future::Future + Unpin>(mut fut: F) -> Option<F::Output> {
    std::future::poll_fn(|cx| {
        std::task::Poll::Ready(match std::pin::Pin::new(&mut fut).poll(cx) {
            std::task::Poll::Ready(out) => Some(out),
            std::task::Poll::Pending => None,
        })
    })
    .await
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `source.rs`

use crate::endpoint::{Endpoint, RecordType};
use crate::errors::SourceError;
use crate::source::{EventHandler, FailingSource, Source, StaticSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn counting_handler(counter: &Arc<AtomicUsize>) -> EventHandler {
    let counter = Arc::clone(counter);
    Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

#[tokio::test]
async fn test_static_source_returns_its_endpoints() {
    let endpoints = vec![
        Endpoint::new("a.example.com", RecordType::A, ["1.1.1.1"]).unwrap(),
        Endpoint::new("b.example.com", RecordType::Cname, ["lb.example.com"]).unwrap(),
    ];
    let source = StaticSource::new(endpoints.clone());

    assert_eq!(source.endpoints().await.unwrap(), endpoints);
    // repeated calls return the same data
    assert_eq!(source.endpoints().await.unwrap(), endpoints);
}

#[tokio::test]
async fn test_empty_static_source() {
    let source = StaticSource::default();

    assert!(source.endpoints().await.unwrap().is_empty());
}

#[test]
fn test_static_source_notifies_handlers() {
    let source = StaticSource::default();
    let counter = Arc::new(AtomicUsize::new(0));

    source.add_event_handler(counting_handler(&counter));
    source.add_event_handler(counting_handler(&counter));
    assert_eq!(source.handler_count(), 2);

    source.notify();
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_boxed_source_delegates() {
    let inner = StaticSource::new(vec![
        Endpoint::new("a.example.com", RecordType::A, ["1.1.1.1"]).unwrap(),
    ]);
    let boxed: Box<dyn Source> = Box::new(inner);

    assert_eq!(boxed.endpoints().await.unwrap().len(), 1);
}

#[test]
fn test_arc_source_forwards_event_handlers() {
    let inner = Arc::new(StaticSource::default());
    let shared: Arc<StaticSource> = Arc::clone(&inner);
    let counter = Arc::new(AtomicUsize::new(0));

    Source::add_event_handler(&shared, counting_handler(&counter));

    assert_eq!(inner.handler_count(), 1);
    inner.notify();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failing_source_reports_upstream_error() {
    let err = FailingSource.endpoints().await.unwrap_err();

    assert!(matches!(err, SourceError::Upstream { .. }));
    assert_eq!(err.to_string(), "source 'failing' failed: boom");
}

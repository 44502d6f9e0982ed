// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `dedup.rs`

use crate::endpoint::{Endpoint, RecordType, Targets};
use crate::errors::SourceError;
use crate::source::{EventHandler, FailingSource, Source, StaticSource};
use crate::test_utils::capture_logs;
use crate::wrappers::dedup::{dedup_endpoints, DedupSource};
use std::sync::Arc;

fn ep(name: &str, record_type: RecordType, targets: &[&str]) -> Endpoint {
    Endpoint {
        dns_name: name.to_string(),
        record_type,
        targets: Targets::new(targets.iter().copied()),
        ..Default::default()
    }
}

#[test]
fn test_dedup_removes_exact_duplicates() {
    let a = ep("foo.example.org", RecordType::A, &["1.2.3.4"]);

    let result = dedup_endpoints(vec![a.clone(), a.clone()]);

    assert_eq!(result, vec![a]);
}

#[test]
fn test_dedup_keeps_distinct_names_and_targets() {
    let input = vec![
        ep("foo.example.org", RecordType::A, &["1.2.3.4"]),
        ep("foo.example.org", RecordType::A, &["4.5.6.7"]),
        ep("bar.example.org", RecordType::A, &["1.2.3.4"]),
    ];

    assert_eq!(dedup_endpoints(input.clone()), input);
}

#[test]
fn test_dedup_keeps_different_record_types() {
    let input = vec![
        ep("foo.example.org", RecordType::A, &["1.2.3.4"]),
        ep("foo.example.org", RecordType::Aaaa, &["::1"]),
    ];

    assert_eq!(dedup_endpoints(input.clone()), input);
}

#[test]
fn test_dedup_compares_all_fields() {
    let plain = ep("foo.example.org", RecordType::A, &["1.2.3.4"]);
    let labelled = plain.clone().with_label("team", "dns");
    let with_set_id = plain.clone().with_set_identifier("eu");

    let result = dedup_endpoints(vec![plain.clone(), labelled.clone(), with_set_id.clone()]);

    assert_eq!(result, vec![plain, labelled, with_set_id]);
}

#[test]
fn test_dedup_treats_targets_as_a_set() {
    let first = ep("foo.example.org", RecordType::A, &["5.6.7.8", "1.2.3.4"]);
    let second = ep("foo.example.org", RecordType::A, &["1.2.3.4", "5.6.7.8", "5.6.7.8"]);

    let result = dedup_endpoints(vec![first, second]);

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].targets, Targets::new(["1.2.3.4", "5.6.7.8"]));
}

#[test]
fn test_dedup_removes_duplicate_targets_within_one_endpoint() {
    let input = vec![ep(
        "foo.example.org",
        RecordType::A,
        &["1.2.3.4", "34.66.66.77", "34.66.66.77"],
    )];

    let result = dedup_endpoints(input);

    assert_eq!(result[0].targets, Targets::new(["1.2.3.4", "34.66.66.77"]));
}

#[test]
fn test_dedup_preserves_empty_input() {
    let unallocated: Vec<Endpoint> = Vec::new();
    assert_eq!(dedup_endpoints(unallocated).capacity(), 0);

    let empty: Vec<Endpoint> = Vec::with_capacity(4);
    assert!(dedup_endpoints(empty).capacity() >= 4);
}

#[test]
fn test_dedup_drops_invalid_srv_and_mx() {
    let valid_srv = ep(
        "_service._tcp.example.org",
        RecordType::Srv,
        &["10 5 443 target.example.org."],
    );
    let invalid_srv = ep(
        "_service._tcp.example.org",
        RecordType::Srv,
        &["11 5 target.example.org"],
    )
    .with_set_identifier("blue");
    let invalid_mx = ep("example.org", RecordType::Mx, &["mail.example.org"]);
    let valid_a = ep("example.org", RecordType::A, &["1.2.3.4"]);

    let (result, logs) = capture_logs(|| {
        dedup_endpoints(vec![
            valid_srv.clone(),
            invalid_srv,
            invalid_mx,
            valid_a.clone(),
        ])
    });

    assert_eq!(result, vec![valid_srv, valid_a]);
    assert!(
        logs.contains(
            "Skipping endpoint [blue:_service._tcp.example.org] due to invalid configuration [SRV:11 5 target.example.org]"
        ),
        "missing SRV warning in logs: {logs}"
    );
    assert!(
        logs.contains("Skipping endpoint [:example.org] due to invalid configuration [MX:mail.example.org]"),
        "missing MX warning in logs: {logs}"
    );
}

#[test]
fn test_dedup_drops_alias_on_unsupported_type() {
    let mx = ep("example.org", RecordType::Mx, &["10 mail.example.org"])
        .with_provider_specific("alias", "true");
    let cname = ep("www.example.org", RecordType::Cname, &["lb.example.org"])
        .with_provider_specific("alias", "true");

    let (result, logs) = capture_logs(|| dedup_endpoints(vec![mx, cname.clone()]));

    assert_eq!(result, vec![cname]);
    assert!(logs.contains("Endpoint example.org of type MX does not support alias records"));
}

#[test]
fn test_dedup_logs_removed_duplicates_at_debug() {
    let a = ep("foo.example.org", RecordType::A, &["1.2.3.4"]);

    let (_, logs) = capture_logs(|| dedup_endpoints(vec![a.clone(), a]));

    assert!(logs.contains("DEBUG"));
    assert!(logs.contains("Removing duplicate endpoint foo.example.org"));
}

#[tokio::test]
async fn test_dedup_source_wraps_inner_source() {
    let a = ep("foo.example.org", RecordType::A, &["1.2.3.4"]);
    let source = DedupSource::new(StaticSource::new(vec![a.clone(), a.clone()]));

    assert_eq!(source.endpoints().await.unwrap(), vec![a]);
}

#[tokio::test]
async fn test_dedup_source_propagates_errors() {
    let source = DedupSource::new(FailingSource);

    let err = source.endpoints().await.unwrap_err();

    assert!(matches!(err, SourceError::Upstream { .. }));
}

#[test]
fn test_dedup_source_forwards_event_handlers() {
    let inner = Arc::new(StaticSource::default());
    let source = DedupSource::new(Arc::clone(&inner));
    let handler: EventHandler = Arc::new(|| {});

    source.add_event_handler(handler);

    assert_eq!(inner.handler_count(), 1);
}

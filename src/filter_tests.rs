// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `filter.rs`

use crate::errors::ConfigError;
use crate::filter::{DomainExclusions, DomainPattern, TargetNetFilter, TargetVerdict};
use ipnet::IpNet;
use std::net::IpAddr;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn net(s: &str) -> IpNet {
    s.parse().unwrap()
}

#[test]
fn test_empty_target_filter_keeps_everything() {
    let filter = TargetNetFilter::default();

    assert!(!filter.is_enabled());
    assert!(filter.matches("1.2.3.4"));
    assert!(filter.matches("2001:db8::1"));
    assert!(filter.matches("lb.example.com"));
}

#[test]
fn test_exclude_net_removes_matching_targets() {
    let filter = TargetNetFilter::new(&[] as &[&str], &["192.168.100.0/24"]).unwrap();

    assert!(filter.is_enabled());
    assert!(filter.matches("1.2.3.4"));
    assert!(!filter.matches("192.168.100.10"));
    assert_eq!(
        filter.check(ip("192.168.100.10")),
        TargetVerdict::Excluded(net("192.168.100.0/24"))
    );
}

#[test]
fn test_include_net_rejects_outside_targets() {
    let filter = TargetNetFilter::new(&["10.0.0.0/8"], &[]).unwrap();

    assert_eq!(filter.check(ip("10.1.2.3")), TargetVerdict::Keep);
    assert_eq!(filter.check(ip("11.0.0.1")), TargetVerdict::NotIncluded);
}

#[test]
fn test_exclude_wins_over_include() {
    let filter = TargetNetFilter::new(&["10.0.0.0/8"], &["10.1.0.0/16"]).unwrap();

    assert_eq!(filter.check(ip("10.2.0.1")), TargetVerdict::Keep);
    assert_eq!(
        filter.check(ip("10.1.0.1")),
        TargetVerdict::Excluded(net("10.1.0.0/16"))
    );
}

#[test]
fn test_ipv4_nets_do_not_affect_ipv6_targets() {
    let exclude_only = TargetNetFilter::new(&[] as &[&str], &["0.0.0.0/0"]).unwrap();
    assert!(exclude_only.matches("2001:db8::1"));
    assert!(!exclude_only.matches("8.8.8.8"));

    // an include list with only IPv4 networks leaves no room for IPv6 addresses
    let include_only = TargetNetFilter::new(&["10.0.0.0/8"], &[]).unwrap();
    assert_eq!(
        include_only.check(ip("2001:db8::1")),
        TargetVerdict::NotIncluded
    );
}

#[test]
fn test_ipv6_exclude_net() {
    let filter = TargetNetFilter::new(&[] as &[&str], &["2001:db8::/32"]).unwrap();

    assert!(!filter.matches("2001:db8::1"));
    assert!(filter.matches("2001:db9::1"));
    assert!(filter.matches("192.0.2.1"));
}

#[test]
fn test_non_ip_targets_always_pass() {
    let filter = TargetNetFilter::new(&["10.0.0.0/8"], &["0.0.0.0/0"]).unwrap();

    assert!(filter.matches("lb.example.com"));
    assert!(filter.matches("\"v=spf1 -all\""));
}

#[test]
fn test_blank_cidrs_are_ignored() {
    let filter = TargetNetFilter::new(&["", "  "], &[" "]).unwrap();

    assert!(!filter.is_enabled());
}

#[test]
fn test_invalid_cidr_is_rejected() {
    let err = TargetNetFilter::new(&[] as &[&str], &["192.168.100.0/33"]).unwrap_err();

    match err {
        ConfigError::InvalidCidr { cidr, .. } => assert_eq!(cidr, "192.168.100.0/33"),
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(TargetNetFilter::new(&["not-a-net"], &[]).is_err());
    // a bare address is not a network
    assert!(TargetNetFilter::new(&["10.0.0.1"], &[]).is_err());
}

#[test]
fn test_wildcard_pattern_matches_subdomains() {
    let pattern = DomainPattern::parse("*.example.com").unwrap();

    assert!(pattern.matches("a.example.com"));
    assert!(pattern.matches("a.b.example.com"));
    assert!(!pattern.matches("example.com"));
    assert!(!pattern.matches("badexample.com"));
    assert!(!pattern.matches("a.example.org"));
}

#[test]
fn test_exact_pattern() {
    let pattern = DomainPattern::parse("example.com").unwrap();

    assert!(pattern.matches("example.com"));
    assert!(!pattern.matches("a.example.com"));
}

#[test]
fn test_pattern_is_case_insensitive_and_ignores_trailing_dot() {
    let pattern = DomainPattern::parse("*.Example.COM.").unwrap();

    assert!(pattern.matches("WWW.example.com"));
    assert!(pattern.matches("www.example.com."));
    assert_eq!(pattern.to_string(), "*.Example.COM.");
}

#[test]
fn test_invalid_patterns() {
    for raw in ["", "   ", "*.", "*.*.example.com", "a.*.example.com", "*example.com"] {
        let err = DomainPattern::parse(raw).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidDomainPattern { .. }),
            "pattern '{raw}' should be rejected, got {err:?}"
        );
    }
}

#[test]
fn test_domain_exclusions_matching() {
    let exclusions = DomainExclusions::new(&["internal.example.com", "*.corp.example.com"]).unwrap();

    assert!(!exclusions.is_empty());
    assert_eq!(
        exclusions
            .matching("db.corp.example.com")
            .map(ToString::to_string),
        Some("*.corp.example.com".to_string())
    );
    assert!(exclusions.matching("internal.example.com").is_some());
    assert!(exclusions.matching("www.example.com").is_none());
}

#[test]
fn test_domain_exclusions_skip_blank_entries() {
    let exclusions = DomainExclusions::new(&["", " "]).unwrap();

    assert!(exclusions.is_empty());
    assert!(exclusions.matching("example.com").is_none());
}

#[test]
fn test_domain_exclusions_report_first_invalid_pattern() {
    let err = DomainExclusions::new(&["ok.example.com", "a.*.example.com"]).unwrap_err();

    assert_eq!(
        err.to_string(),
        "invalid domain pattern 'a.*.example.com': wildcard is only allowed as the leading label"
    );
}

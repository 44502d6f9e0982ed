// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # dnsource - Endpoint sources for Kubernetes DNS synchronization
//!
//! dnsource turns cluster resources into a normalized, conflict-resolved set
//! of desired DNS records ("endpoints") ready to be diffed against a DNS
//! provider.
//!
//! ## Overview
//!
//! Resource adapters produce candidate endpoints that frequently overlap:
//! several resources may claim the same hostname. This library provides:
//!
//! - The [`endpoint::Endpoint`] data model and its validation rules
//! - The merge engine ([`merge::merge_endpoints`]) that unions targets per
//!   record, refuses to merge conflicting CNAMEs and drops empty ones
//! - Decorator sources ([`wrappers`]) removing duplicates, adding IPv4
//!   companions for NAT64 targets, filtering targets by network and names by
//!   pattern, and applying defaults
//! - A [`crd::DNSEndpoint`] custom resource and the [`crd_source::CrdSource`]
//!   reading it from a reflector cache
//!
//! ## Modules
//!
//! - [`endpoint`] - Endpoint, record type, targets and TTL types
//! - [`merge`] - Target normalization, merge key and merge engine
//! - [`source`] - The `Source` trait and a static source
//! - [`wrappers`] - Dedup, NAT64, filter and post-processing wrappers
//! - [`filter`] - CIDR and DNS name pattern filters
//! - [`crd`] / [`crd_source`] - `DNSEndpoint` resources and their source
//! - [`config`] - Configuration file loading and validation
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust
//! use dnsource::endpoint::{Endpoint, RecordType};
//! use dnsource::merge::merge_endpoints;
//!
//! let merged = merge_endpoints(vec![
//!     Endpoint::new("example.com", RecordType::Cname, ["a.elb.com"]).unwrap(),
//!     Endpoint::new("example.com", RecordType::Cname, ["a.elb.com"]).unwrap(),
//! ]);
//!
//! assert_eq!(merged.len(), 1);
//! ```

pub mod config;
pub mod constants;
pub mod crd;
pub mod crd_source;
pub mod endpoint;
pub mod errors;
pub mod filter;
pub mod labels;
pub mod merge;
pub mod metrics;
pub mod source;
pub mod wrappers;

#[cfg(test)]
mod test_utils;

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Decorator sources that post-process the endpoints of an inner source.
//!
//! Every wrapper implements [`Source`](crate::source::Source) by calling the
//! wrapped source and transforming its result, and forwards event handler
//! registration to it. The transformations never fail: configuration is
//! validated when the wrapper is built, and anything dropped at call time is
//! reported through `debug!`/`warn!` logs and the drop counters in
//! [`crate::metrics`].
//!
//! # Available Wrappers
//!
//! - [`DedupSource`] - Removes exact duplicates and invalid endpoints
//! - [`Nat64Source`] - Adds A endpoints for NAT64-mapped AAAA targets
//! - [`FilterSource`] - Removes targets by network and endpoints by DNS name
//! - [`PostProcessor`] - Applies a default TTL, owner label and alias preference
//!
//! The `render` and `watch` commands stack them as
//! `PostProcessor(FilterSource(Nat64Source(DedupSource(source))))`.

pub mod dedup;
pub mod filter;
pub mod nat64;
pub mod post_processor;

pub use dedup::{dedup_endpoints, DedupSource};
pub use filter::FilterSource;
pub use nat64::Nat64Source;
pub use post_processor::PostProcessor;

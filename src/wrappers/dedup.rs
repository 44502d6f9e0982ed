// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Exact-duplicate and validity filtering.

use crate::constants::{DROP_REASON_DUPLICATE, DROP_REASON_INVALID, DROP_REASON_UNSUPPORTED_ALIAS};
use crate::endpoint::Endpoint;
use crate::errors::SourceError;
use crate::metrics;
use crate::source::{EventHandler, Source};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Wraps a source and removes duplicate endpoints from its output.
///
/// Two endpoints are duplicates when every field is equal once each
/// endpoint's targets have been deduplicated and sorted. Endpoints that differ
/// only in labels or provider-specific properties are kept apart. Endpoints
/// with malformed MX/SRV targets, or asking for an alias on a type that cannot
/// be aliased, are dropped with a warning.
pub struct DedupSource<S> {
    inner: S,
}

impl<S> DedupSource<S> {
    /// Wrap `inner`.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl<S: Source> Source for DedupSource<S> {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError> {
        let endpoints = self.inner.endpoints().await?;
        Ok(dedup_endpoints(endpoints))
    }

    fn add_event_handler(&self, handler: EventHandler) {
        debug!("Forwarding event handler from dedup source");
        self.inner.add_event_handler(handler);
    }
}

/// Drop invalid endpoints and exact duplicates, keeping the first occurrence.
///
/// The targets of every surviving endpoint are deduplicated and sorted. An
/// empty input is returned untouched.
#[must_use]
pub fn dedup_endpoints(endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
    if endpoints.is_empty() {
        return endpoints;
    }

    let mut seen: HashSet<Endpoint> = HashSet::with_capacity(endpoints.len());
    let mut result = Vec::with_capacity(endpoints.len());

    for mut ep in endpoints {
        if !ep.check_endpoint() {
            warn!(
                dns_name = %ep.dns_name,
                "Skipping endpoint [{}:{}] due to invalid configuration [{}:{}]",
                ep.set_identifier,
                ep.dns_name,
                ep.record_type,
                ep.targets
            );
            metrics::record_endpoint_dropped(DROP_REASON_INVALID);
            continue;
        }

        if !ep.supports_alias() {
            warn!(
                dns_name = %ep.dns_name,
                "Endpoint {} of type {} does not support alias records",
                ep.dns_name,
                ep.record_type
            );
            metrics::record_endpoint_dropped(DROP_REASON_UNSUPPORTED_ALIAS);
            continue;
        }

        ep.targets = ep.targets.normalized();
        if seen.contains(&ep) {
            debug!("Removing duplicate endpoint {}", ep);
            metrics::record_endpoint_dropped(DROP_REASON_DUPLICATE);
            continue;
        }

        seen.insert(ep.clone());
        result.push(ep);
    }

    result
}

#[cfg(test)]
#[path = "dedup_tests.rs"]
mod dedup_tests;

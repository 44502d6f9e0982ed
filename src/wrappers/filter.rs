// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Target network and DNS name filtering.

use crate::constants::{
    DROP_REASON_EXCLUDED_DOMAIN, DROP_REASON_NO_TARGETS, FILTER_REASON_EXCLUDED_NET,
    FILTER_REASON_NOT_INCLUDED,
};
use crate::endpoint::Endpoint;
use crate::errors::SourceError;
use crate::filter::{DomainExclusions, TargetNetFilter, TargetVerdict};
use crate::metrics;
use crate::source::{EventHandler, Source};
use std::net::IpAddr;
use tracing::debug;

/// Wraps a source and removes unwanted targets and endpoints from its output.
///
/// - Targets of A and AAAA endpoints that parse as IP addresses are checked
///   against the [`TargetNetFilter`]. An endpoint whose targets are all
///   removed is dropped. Targets that are not IP addresses are kept.
/// - Endpoints whose DNS name matches one of the [`DomainExclusions`] are
///   dropped whatever their type.
pub struct FilterSource<S> {
    inner: S,
    target_filter: TargetNetFilter,
    domain_exclusions: DomainExclusions,
}

impl<S> FilterSource<S> {
    /// Wrap `inner` with already validated filters.
    pub fn new(inner: S, target_filter: TargetNetFilter, domain_exclusions: DomainExclusions) -> Self {
        Self {
            inner,
            target_filter,
            domain_exclusions,
        }
    }

    /// True when at least one filter is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.target_filter.is_enabled() || !self.domain_exclusions.is_empty()
    }

    /// Apply both filters to a batch of endpoints.
    ///
    /// With no filter configured the input is returned untouched.
    #[must_use]
    pub fn filter_endpoints(&self, endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
        if !self.is_enabled() {
            return endpoints;
        }

        endpoints
            .into_iter()
            .filter_map(|ep| self.filter_endpoint(ep))
            .collect()
    }

    fn filter_endpoint(&self, mut ep: Endpoint) -> Option<Endpoint> {
        if let Some(pattern) = self.domain_exclusions.matching(&ep.dns_name) {
            debug!(
                dns_name = %ep.dns_name,
                "Excluding endpoint {} matching domain pattern {}",
                ep.dns_name,
                pattern
            );
            metrics::record_endpoint_dropped(DROP_REASON_EXCLUDED_DOMAIN);
            return None;
        }

        if !self.target_filter.is_enabled() || !ep.record_type.is_address() || ep.targets.is_empty()
        {
            return Some(ep);
        }

        let dns_name = ep.dns_name.clone();
        ep.targets
            .retain(|target| self.keep_target(&dns_name, target));

        if ep.targets.is_empty() {
            debug!(
                dns_name = %ep.dns_name,
                "Dropping endpoint {} because all of its targets were filtered",
                ep.dns_name
            );
            metrics::record_endpoint_dropped(DROP_REASON_NO_TARGETS);
            return None;
        }

        Some(ep)
    }

    fn keep_target(&self, dns_name: &str, target: &str) -> bool {
        let Ok(ip) = target.parse::<IpAddr>() else {
            return true;
        };

        match self.target_filter.check(ip) {
            TargetVerdict::Keep => true,
            TargetVerdict::Excluded(net) => {
                debug!(
                    dns_name = %dns_name,
                    "Removing target {} of {}: inside excluded network {}",
                    target,
                    dns_name,
                    net
                );
                metrics::record_target_filtered(FILTER_REASON_EXCLUDED_NET);
                false
            }
            TargetVerdict::NotIncluded => {
                debug!(
                    dns_name = %dns_name,
                    "Removing target {} of {}: outside every target network",
                    target,
                    dns_name
                );
                metrics::record_target_filtered(FILTER_REASON_NOT_INCLUDED);
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl<S: Source> Source for FilterSource<S> {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError> {
        let endpoints = self.inner.endpoints().await?;
        Ok(self.filter_endpoints(endpoints))
    }

    fn add_event_handler(&self, handler: EventHandler) {
        debug!("Forwarding event handler from filter source");
        self.inner.add_event_handler(handler);
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod filter_tests;

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Final touches applied to every endpoint of a source.

use crate::constants::PROVIDER_SPECIFIC_ALIAS;
use crate::endpoint::{Endpoint, RecordType, Ttl};
use crate::errors::SourceError;
use crate::labels::OWNER_LABEL_KEY;
use crate::source::{EventHandler, Source};
use std::time::Duration;
use tracing::debug;

/// Wraps a source and completes the endpoints it produces.
///
/// Each step is off until enabled with its builder method:
///
/// ```rust
/// use dnsource::source::StaticSource;
/// use dnsource::wrappers::PostProcessor;
/// use std::time::Duration;
///
/// let source = PostProcessor::new(StaticSource::default())
///     .with_ttl(Duration::from_secs(300))
///     .with_owner_id("cluster-a")
///     .with_prefer_alias(true);
/// ```
pub struct PostProcessor<S> {
    inner: S,
    ttl: Option<Ttl>,
    owner_id: Option<String>,
    prefer_alias: bool,
}

impl<S> PostProcessor<S> {
    /// Wrap `inner` with every step disabled.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            ttl: None,
            owner_id: None,
            prefer_alias: false,
        }
    }

    /// Apply `ttl` to endpoints that carry no TTL of their own.
    ///
    /// The TTL is truncated to whole seconds; anything below one second
    /// disables the step.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        let seconds = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        self.ttl = (seconds > 0).then_some(Ttl(seconds));
        self
    }

    /// Stamp the owner label with `owner_id`. An empty id disables the step.
    #[must_use]
    pub fn with_owner_id(mut self, owner_id: impl Into<String>) -> Self {
        let owner_id = owner_id.into();
        self.owner_id = (!owner_id.is_empty()).then_some(owner_id);
        self
    }

    /// Mark CNAME endpoints with the `alias=true` provider-specific property.
    ///
    /// An explicit `alias` property already set on the endpoint is left alone.
    #[must_use]
    pub fn with_prefer_alias(mut self, prefer_alias: bool) -> Self {
        self.prefer_alias = prefer_alias;
        self
    }

    /// Apply the enabled steps to a batch of endpoints.
    #[must_use]
    pub fn process_endpoints(&self, mut endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
        for ep in &mut endpoints {
            if let Some(ttl) = self.ttl {
                if !ep.record_ttl.is_configured() {
                    ep.record_ttl = ttl;
                }
            }

            if let Some(owner_id) = &self.owner_id {
                ep.labels
                    .insert(OWNER_LABEL_KEY.to_string(), owner_id.clone());
            }

            if self.prefer_alias
                && ep.record_type == RecordType::Cname
                && ep.provider_specific_property(PROVIDER_SPECIFIC_ALIAS).is_none()
            {
                ep.set_provider_specific_property(PROVIDER_SPECIFIC_ALIAS, "true");
            }
        }
        endpoints
    }
}

#[async_trait::async_trait]
impl<S: Source> Source for PostProcessor<S> {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError> {
        let endpoints = self.inner.endpoints().await?;
        Ok(self.process_endpoints(endpoints))
    }

    fn add_event_handler(&self, handler: EventHandler) {
        debug!("Forwarding event handler from post processor");
        self.inner.add_event_handler(handler);
    }
}

#[cfg(test)]
#[path = "post_processor_tests.rs"]
mod post_processor_tests;

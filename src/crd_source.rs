// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Endpoint source backed by `DNSEndpoint` custom resources.
//!
//! The source reads from a kube-rs reflector [`Store`] kept up to date by a
//! watcher, so producing endpoints never touches the API server. When a
//! client is attached, the source also records the generation it has
//! processed in each resource's `status.observedGeneration`.
//!
//! # Example
//!
//! ```rust,no_run
//! use dnsource::config::ControllerConfig;
//! use dnsource::crd::DNSEndpoint;
//! use dnsource::crd_source::CrdSource;
//! use kube::runtime::reflector;
//!
//! let (store, _writer) = reflector::store::<DNSEndpoint>();
//! let source = CrdSource::new(store, ControllerConfig::default()).with_namespace("dns");
//! ```

use crate::config::ControllerConfig;
use crate::constants::{CRD_RESOURCE_PREFIX, DROP_REASON_ILLEGAL_TARGET};
use crate::crd::DNSEndpoint;
use crate::endpoint::{Endpoint, RecordType};
use crate::errors::SourceError;
use crate::labels::RESOURCE_LABEL_KEY;
use crate::merge::merge_endpoints;
use crate::metrics;
use crate::source::{EventHandler, EventHandlers, Source};
use kube::api::{Patch, PatchParams};
use kube::runtime::reflector::Store;
use kube::{Api, Client, ResourceExt};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads endpoints from `DNSEndpoint` resources.
///
/// A resource is read when it lives in the configured namespace (any
/// namespace if none is set) and its controller annotation is either absent
/// or equal to the configured value.
pub struct CrdSource {
    store: Store<DNSEndpoint>,
    namespace: Option<String>,
    controller: ControllerConfig,
    client: Option<Client>,
    handlers: EventHandlers,
}

impl CrdSource {
    /// Create a source over `store`, reading every namespace.
    #[must_use]
    pub fn new(store: Store<DNSEndpoint>, controller: ControllerConfig) -> Self {
        Self {
            store,
            namespace: None,
            controller,
            client: None,
            handlers: EventHandlers::default(),
        }
    }

    /// Only read resources in `namespace`. An empty namespace means all namespaces.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = (!namespace.is_empty()).then_some(namespace);
        self
    }

    /// Record the processed generation in the status of each resource read.
    #[must_use]
    pub fn with_status_updates(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Number of registered event handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Fire every registered event handler.
    ///
    /// Called by the watch loop whenever a `DNSEndpoint` is added, changed or removed.
    pub fn notify(&self) {
        self.handlers.notify();
    }

    /// The resources this source reads, ordered by namespace and name.
    #[must_use]
    pub fn selected_resources(&self) -> Vec<Arc<DNSEndpoint>> {
        let mut resources: Vec<Arc<DNSEndpoint>> = self
            .store
            .state()
            .into_iter()
            .filter(|res| self.is_selected(res))
            .collect();
        resources.sort_by_key(|res| (res.namespace().unwrap_or_default(), res.name_any()));
        resources
    }

    /// Collect and merge the endpoints of every selected resource.
    ///
    /// Same output as [`Source::endpoints`] without the status updates.
    #[must_use]
    pub fn collect_endpoints(&self) -> Vec<Endpoint> {
        merged_endpoints(&self.selected_resources())
    }

    fn is_selected(&self, resource: &DNSEndpoint) -> bool {
        if let Some(namespace) = &self.namespace {
            if resource.namespace().as_deref() != Some(namespace.as_str()) {
                return false;
            }
        }

        match resource.annotations().get(&self.controller.key) {
            Some(value) if *value != self.controller.value => {
                debug!(
                    "Skipping DNSEndpoint {}/{} because {} is '{}', not '{}'",
                    resource.namespace().unwrap_or_default(),
                    resource.name_any(),
                    self.controller.key,
                    value,
                    self.controller.value
                );
                false
            }
            _ => true,
        }
    }

    async fn update_observed_generation(&self, client: &Client, resource: &DNSEndpoint) {
        let Some(generation) = resource.metadata.generation else {
            return;
        };
        let observed = resource
            .status
            .as_ref()
            .and_then(|status| status.observed_generation);
        if observed == Some(generation) {
            return;
        }

        let namespace = resource.namespace().unwrap_or_default();
        let name = resource.name_any();
        let api: Api<DNSEndpoint> = Api::namespaced(client.clone(), &namespace);
        let patch = json!({
            "status": {
                "observedGeneration": generation
            }
        });

        match api
            .patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
        {
            Ok(_) => debug!(
                "Updated observedGeneration of DNSEndpoint {}/{} to {}",
                namespace, name, generation
            ),
            Err(e) => warn!(
                "Could not update observedGeneration of DNSEndpoint {}/{}: {}",
                namespace, name, e
            ),
        }
    }
}

fn merged_endpoints(resources: &[Arc<DNSEndpoint>]) -> Vec<Endpoint> {
    let endpoints = resources
        .iter()
        .flat_map(|res| resource_endpoints(res))
        .collect();
    merge_endpoints(endpoints)
}

/// Endpoints declared by one resource, stamped with the resource label.
/// Endpoints with an illegal target format are dropped.
fn resource_endpoints(resource: &DNSEndpoint) -> Vec<Endpoint> {
    let namespace = resource.namespace().unwrap_or_default();
    let name = resource.name_any();
    let resource_label = format!("{CRD_RESOURCE_PREFIX}/{namespace}/{name}");

    let mut endpoints = Vec::with_capacity(resource.spec.endpoints.len());
    for ep in &resource.spec.endpoints {
        if ep.targets.is_empty()
            && matches!(
                ep.record_type,
                RecordType::A | RecordType::Aaaa | RecordType::Cname
            )
        {
            debug!(
                "Endpoint {}/{} with DNSName {} has an empty list of targets",
                namespace, name, ep.dns_name
            );
        }

        if !ep.has_valid_target_format() {
            warn!(
                dns_name = %ep.dns_name,
                "Endpoint {}/{} with DNSName {} has an illegal target format.",
                namespace,
                name,
                ep.dns_name
            );
            metrics::record_endpoint_dropped(DROP_REASON_ILLEGAL_TARGET);
            continue;
        }

        endpoints.push(ep.clone().with_label(RESOURCE_LABEL_KEY, resource_label.clone()));
    }
    endpoints
}

#[async_trait::async_trait]
impl Source for CrdSource {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError> {
        let resources = self.selected_resources();
        let endpoints = merged_endpoints(&resources);

        if let Some(client) = &self.client {
            for resource in &resources {
                self.update_observed_generation(client, resource).await;
            }
        }

        Ok(endpoints)
    }

    fn add_event_handler(&self, handler: EventHandler) {
        debug!("Adding event handler to DNSEndpoint source");
        self.handlers.push(handler);
    }
}

#[cfg(test)]
#[path = "crd_source_tests.rs"]
mod crd_source_tests;

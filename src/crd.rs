// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for declarative endpoints.
//!
//! # Resource Types
//!
//! - [`DNSEndpoint`] - A list of endpoints written directly by users or by
//!   other controllers, read by [`crate::crd_source::CrdSource`]
//!
//! # Example: Declaring Endpoints
//!
//! ```rust
//! use dnsource::crd::{DNSEndpoint, DNSEndpointSpec};
//! use dnsource::endpoint::{Endpoint, RecordType};
//!
//! let spec = DNSEndpointSpec {
//!     endpoints: vec![
//!         Endpoint::new("www.example.com", RecordType::A, ["192.0.2.1"]).unwrap(),
//!     ],
//! };
//! let resource = DNSEndpoint::new("www", spec);
//! assert_eq!(resource.spec.endpoints.len(), 1);
//! ```

use crate::endpoint::Endpoint;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `DNSEndpoint` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DNSEndpointStatus {
    /// The generation observed by the controller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// `DNSEndpoint` declares DNS records explicitly.
///
/// # Example
///
/// ```yaml
/// apiVersion: dnsource.firestoned.io/v1alpha1
/// kind: DNSEndpoint
/// metadata:
///   name: www
///   namespace: default
///   annotations:
///     dnsource.firestoned.io/controller: dns-controller
/// spec:
///   endpoints:
///     - dnsName: www.example.com
///       recordType: A
///       recordTTL: 300
///       targets:
///         - 192.0.2.1
///         - 192.0.2.2
/// ```
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[kube(
    group = "dnsource.firestoned.io",
    version = "v1alpha1",
    kind = "DNSEndpoint",
    plural = "dnsendpoints",
    namespaced,
    doc = "DNSEndpoint declares a list of DNS endpoints to publish as-is."
)]
#[kube(status = "DNSEndpointStatus")]
#[serde(rename_all = "camelCase")]
pub struct DNSEndpointSpec {
    /// Endpoints to publish.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;

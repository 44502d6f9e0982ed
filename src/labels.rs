// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label and annotation keys used on endpoints and on watched resources.
//!
//! Endpoint labels carry bookkeeping metadata (ownership, originating resource)
//! across reconciliation passes. Annotation keys are only defaults: the values
//! actually used at runtime come from [`crate::config::SourceConfig`].

// ============================================================================
// Endpoint Labels
// ============================================================================

/// Label holding the owner id of the controller instance that manages an endpoint
pub const OWNER_LABEL_KEY: &str = "dnsource.firestoned.io/owner";

/// Label identifying the resource (`kind/namespace/name`) an endpoint was produced from
pub const RESOURCE_LABEL_KEY: &str = "dnsource.firestoned.io/resource";

// ============================================================================
// Resource Annotations
// ============================================================================

/// Default annotation key selecting which controller processes a resource
pub const CONTROLLER_ANNOTATION_KEY: &str = "dnsource.firestoned.io/controller";

/// Default value of the controller annotation handled by this controller
pub const CONTROLLER_ANNOTATION_VALUE: &str = "dns-controller";

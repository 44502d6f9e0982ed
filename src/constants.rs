// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the dnsource crate.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for the `DNSEndpoint` CRD
pub const API_GROUP: &str = "dnsource.firestoned.io";

/// API version for the `DNSEndpoint` CRD
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "dnsource.firestoned.io/v1alpha1";

/// Kind name for `DNSEndpoint` resource
pub const KIND_DNS_ENDPOINT: &str = "DNSEndpoint";

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// Maximum length of a single DNS label in octets (RFC 1035 section 2.3.4)
pub const MAX_DNS_LABEL_LENGTH: usize = 63;

/// Separator used when rendering a target list as a single string
pub const TARGET_SEPARATOR: &str = ";";

/// Provider-specific property marking an endpoint as a provider alias record
pub const PROVIDER_SPECIFIC_ALIAS: &str = "alias";

// ============================================================================
// Source Defaults
// ============================================================================

/// Prefix of the resource label value stamped by the CRD source
pub const CRD_RESOURCE_PREFIX: &str = "crd";

/// Default interval between two renders in `watch` mode
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 60;

// ============================================================================
// Metrics Constants
// ============================================================================

/// Drop reason: CNAME endpoint without any target
pub const DROP_REASON_EMPTY_CNAME: &str = "empty_cname";

/// Drop reason: endpoint failed record validation
pub const DROP_REASON_INVALID: &str = "invalid";

/// Drop reason: endpoint type does not support alias records
pub const DROP_REASON_UNSUPPORTED_ALIAS: &str = "unsupported_alias";

/// Drop reason: endpoint was an exact duplicate
pub const DROP_REASON_DUPLICATE: &str = "duplicate";

/// Drop reason: DNS name matched an exclusion pattern
pub const DROP_REASON_EXCLUDED_DOMAIN: &str = "excluded_domain";

/// Drop reason: every target was removed by the target filter
pub const DROP_REASON_NO_TARGETS: &str = "no_targets";

/// Drop reason: target format violates the trailing-dot rules
pub const DROP_REASON_ILLEGAL_TARGET: &str = "illegal_target";

/// Filter reason: target is inside an excluded network
pub const FILTER_REASON_EXCLUDED_NET: &str = "excluded_net";

/// Filter reason: target is outside every included network
pub const FILTER_REASON_NOT_INCLUDED: &str = "not_included";

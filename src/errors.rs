// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for dnsource.
//!
//! This module provides specialized error types for:
//! - Endpoint construction (malformed names, unknown record types)
//! - Startup configuration (CIDR lists, domain exclusion patterns, config files)
//! - Endpoint sources (upstream failures, unparsable targets)
//!
//! The merge engine and the filtering wrappers never return errors: every
//! conflicting or malformed endpoint has a defined outcome and is only
//! reported through logs and metrics.

use thiserror::Error;

/// Errors that can occur while building an [`crate::endpoint::Endpoint`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    /// A label of the DNS name exceeds 63 octets
    ///
    /// Returned by the endpoint constructors, which refuse names that no DNS
    /// provider could ever publish.
    #[error("label '{label}' in '{dns_name}' is longer than 63 characters")]
    LabelTooLong {
        /// The offending label
        label: String,
        /// The full DNS name containing the label
        dns_name: String,
    },

    /// Record type mnemonic is not one of the supported types
    #[error("unknown record type '{0}'")]
    UnknownRecordType(String),
}

/// Errors raised while loading or validating configuration.
///
/// These are reported once at startup; the per-call filtering path only ever
/// sees configuration that has already passed validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A target network is not a valid CIDR
    #[error("invalid CIDR '{cidr}': {reason}")]
    InvalidCidr {
        /// The CIDR as written in the configuration
        cidr: String,
        /// Parser error message
        reason: String,
    },

    /// A NAT64 prefix is not an IPv6 /96 network
    #[error("invalid NAT64 prefix '{prefix}': {reason}")]
    InvalidNat64Prefix {
        /// The prefix as written in the configuration
        prefix: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// A domain exclusion pattern is malformed
    ///
    /// Only a single leading `*.` wildcard is supported.
    #[error("invalid domain pattern '{pattern}': {reason}")]
    InvalidDomainPattern {
        /// The pattern as written in the configuration
        pattern: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// The configuration file could not be read
    #[error("failed to read configuration file '{path}': {source}")]
    Io {
        /// Path of the configuration file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration document could not be parsed
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Errors returned by endpoint sources.
#[derive(Error, Debug)]
pub enum SourceError {
    /// A target that must be an IP address could not be parsed
    #[error("target '{target}' of {dns_name} is not a valid IP address")]
    InvalidTarget {
        /// DNS name of the endpoint carrying the target
        dns_name: String,
        /// The unparsable target
        target: String,
    },

    /// The wrapped source failed
    #[error("source '{source_name}' failed: {reason}")]
    Upstream {
        /// Name of the failing source
        source_name: String,
        /// Reason reported by the source
        reason: String,
    },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;

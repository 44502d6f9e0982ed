// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Source configuration.
//!
//! Configuration is read once at startup from a YAML (or JSON) document and
//! validated into the filters used by the wrappers. Every field is optional:
//!
//! ```yaml
//! targetNets: ["10.0.0.0/8"]
//! excludeTargetNets: ["10.96.0.0/12"]
//! excludeDomains: ["*.internal.example.com"]
//! nat64Prefixes: ["64:ff9b::/96"]
//! defaultTtl: 300
//! ownerId: cluster-a
//! preferAlias: false
//! namespace: dns
//! controllerAnnotation:
//!   key: dnsource.firestoned.io/controller
//!   value: dns-controller
//! ```

use crate::errors::ConfigError;
use crate::filter::{DomainExclusions, TargetNetFilter};
use crate::labels::{CONTROLLER_ANNOTATION_KEY, CONTROLLER_ANNOTATION_VALUE};
use crate::wrappers::nat64::parse_nat64_prefixes;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Annotation marking the resources this controller is responsible for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfig {
    /// Annotation key
    pub key: String,
    /// Expected annotation value
    pub value: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            key: CONTROLLER_ANNOTATION_KEY.to_string(),
            value: CONTROLLER_ANNOTATION_VALUE.to_string(),
        }
    }
}

/// Configuration of the source chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceConfig {
    /// Only keep A/AAAA targets inside these networks (empty keeps all)
    pub target_nets: Vec<String>,

    /// Drop A/AAAA targets inside these networks
    pub exclude_target_nets: Vec<String>,

    /// Drop endpoints whose DNS name matches one of these patterns
    pub exclude_domains: Vec<String>,

    /// NAT64 `/96` prefixes whose AAAA targets gain an IPv4 A endpoint
    pub nat64_prefixes: Vec<String>,

    /// TTL in seconds applied to endpoints without one (0 disables)
    pub default_ttl: u64,

    /// Value of the owner label stamped on every endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    /// Mark CNAME endpoints as provider aliases
    pub prefer_alias: bool,

    /// Restrict the CRD source to one namespace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Annotation selecting the `DNSEndpoint` resources to process
    pub controller_annotation: ControllerConfig,
}

/// Filters built from a validated [`SourceConfig`].
#[derive(Clone, Debug, Default)]
pub struct SourceFilters {
    /// Target network filter
    pub target_nets: TargetNetFilter,
    /// DNS name exclusions
    pub exclude_domains: DomainExclusions,
}

impl SourceConfig {
    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is not valid YAML or
    /// contains unexpected value types.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if its content is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Build the filters described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCidr`], [`ConfigError::InvalidNat64Prefix`]
    /// or [`ConfigError::InvalidDomainPattern`] for the first malformed entry.
    pub fn validate(&self) -> Result<SourceFilters, ConfigError> {
        parse_nat64_prefixes(&self.nat64_prefixes)?;
        Ok(SourceFilters {
            target_nets: TargetNetFilter::new(&self.target_nets, &self.exclude_target_nets)?,
            exclude_domains: DomainExclusions::new(&self.exclude_domains)?,
        })
    }

    /// The default TTL as a [`Duration`].
    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! IPv4 companions for NAT64-mapped AAAA records.
//!
//! A NAT64 prefix is an IPv6 `/96` network whose last 32 bits carry an IPv4
//! address (RFC 6052). With `2001:db8::/96` configured, an AAAA endpoint
//! targeting `2001:db8::c000:22a` gains an A endpoint targeting `192.0.2.42`.

use crate::endpoint::{Endpoint, RecordType, Targets};
use crate::errors::{ConfigError, SourceError};
use crate::source::{EventHandler, Source};
use ipnet::{IpNet, Ipv6Net};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::debug;

/// Prefix length of every supported NAT64 network
const NAT64_PREFIX_LEN: u8 = 96;

/// Wraps a source and adds an A endpoint next to every AAAA endpoint with
/// targets inside a configured NAT64 prefix.
///
/// The A endpoint copies every other field of its AAAA parent and holds the
/// embedded IPv4 address of each mapped target. AAAA targets outside every
/// prefix are left alone.
pub struct Nat64Source<S> {
    inner: S,
    prefixes: Vec<Ipv6Net>,
}

impl<S> Nat64Source<S> {
    /// Wrap `inner` with NAT64 `prefixes`. Blank entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidNat64Prefix`] for the first entry that is
    /// not an IPv6 `/96` network.
    pub fn new<P: AsRef<str>>(inner: S, prefixes: &[P]) -> Result<Self, ConfigError> {
        Ok(Self {
            inner,
            prefixes: parse_nat64_prefixes(prefixes)?,
        })
    }

    /// True when at least one prefix is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.prefixes.is_empty()
    }

    /// The configured prefixes.
    #[must_use]
    pub fn prefixes(&self) -> &[Ipv6Net] {
        &self.prefixes
    }

    /// Add the IPv4 companion of every NAT64-mapped AAAA endpoint, right after
    /// its parent. With no prefix configured the input is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidTarget`] when an AAAA target is not an IP
    /// address.
    pub fn map_endpoints(&self, endpoints: Vec<Endpoint>) -> Result<Vec<Endpoint>, SourceError> {
        if !self.is_enabled() {
            return Ok(endpoints);
        }

        let mut result = Vec::with_capacity(endpoints.len());
        for parent in endpoints {
            let companion = self.ipv4_companion(&parent)?;
            result.push(parent);
            result.extend(companion);
        }
        Ok(result)
    }

    fn ipv4_companion(&self, parent: &Endpoint) -> Result<Option<Endpoint>, SourceError> {
        if parent.record_type != RecordType::Aaaa {
            return Ok(None);
        }

        let mut v4_targets = Vec::new();
        for target in parent.targets.iter() {
            let ip: IpAddr = target.parse().map_err(|_| SourceError::InvalidTarget {
                dns_name: parent.dns_name.clone(),
                target: target.clone(),
            })?;
            let IpAddr::V6(ip) = ip else {
                continue;
            };
            if self.prefixes.iter().any(|prefix| prefix.contains(&ip)) {
                v4_targets.push(embedded_ipv4(ip).to_string());
            }
        }

        if v4_targets.is_empty() {
            return Ok(None);
        }

        debug!(
            dns_name = %parent.dns_name,
            "Adding A endpoint {} for NAT64 targets [{}]",
            parent.dns_name,
            v4_targets.join(", ")
        );
        let mut companion = parent.clone();
        companion.record_type = RecordType::A;
        companion.targets = Targets(v4_targets);
        Ok(Some(companion))
    }
}

/// Parse NAT64 prefixes. Blank entries are ignored.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidNat64Prefix`] for the first entry that is
/// not an IPv6 `/96` network.
pub fn parse_nat64_prefixes<P: AsRef<str>>(prefixes: &[P]) -> Result<Vec<Ipv6Net>, ConfigError> {
    prefixes
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|p| !p.is_empty())
        .map(parse_prefix)
        .collect()
}

fn parse_prefix(prefix: &str) -> Result<Ipv6Net, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidNat64Prefix {
        prefix: prefix.to_string(),
        reason,
    };

    match prefix.parse::<IpNet>().map_err(|e| invalid(e.to_string()))? {
        IpNet::V4(_) => Err(invalid("not an IPv6 network".to_string())),
        IpNet::V6(net) if net.prefix_len() != NAT64_PREFIX_LEN => Err(invalid(format!(
            "prefix length must be {NAT64_PREFIX_LEN}, got {}",
            net.prefix_len()
        ))),
        IpNet::V6(net) => Ok(net.trunc()),
    }
}

/// The IPv4 address carried in the last 32 bits of a /96-mapped address.
fn embedded_ipv4(ip: Ipv6Addr) -> Ipv4Addr {
    let [.., a, b, c, d] = ip.octets();
    Ipv4Addr::new(a, b, c, d)
}

#[async_trait::async_trait]
impl<S: Source> Source for Nat64Source<S> {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError> {
        let endpoints = self.inner.endpoints().await?;
        self.map_endpoints(endpoints)
    }

    fn add_event_handler(&self, handler: EventHandler) {
        debug!("Forwarding event handler from NAT64 source");
        self.inner.add_event_handler(handler);
    }
}

#[cfg(test)]
#[path = "nat64_tests.rs"]
mod nat64_tests;

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Target network and DNS name filters.
//!
//! Both filters are built once from configuration. Building is the only step
//! that can fail: afterwards matching is infallible and cheap enough to run on
//! every target of every endpoint.
//!
//! # Example
//!
//! ```rust
//! use dnsource::filter::{DomainExclusions, TargetNetFilter};
//!
//! let nets = TargetNetFilter::new(&[] as &[&str], &["192.168.100.0/24"]).unwrap();
//! assert!(nets.matches("1.2.3.4"));
//! assert!(!nets.matches("192.168.100.10"));
//!
//! let domains = DomainExclusions::new(&["*.internal.example.com"]).unwrap();
//! assert!(domains.matching("db.internal.example.com").is_some());
//! assert!(domains.matching("internal.example.com").is_none());
//! ```

use crate::errors::ConfigError;
use ipnet::IpNet;
use std::fmt;
use std::net::IpAddr;

/// Outcome of checking one IP target against a [`TargetNetFilter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetVerdict {
    /// The target passes the filter
    Keep,
    /// The target lies inside this excluded network
    Excluded(IpNet),
    /// Include networks are configured and the target is outside all of them
    NotIncluded,
}

/// Include/exclude CIDR filter for IP targets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetNetFilter {
    include: Vec<IpNet>,
    exclude: Vec<IpNet>,
}

impl TargetNetFilter {
    /// Parse include and exclude CIDR lists. Blank entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCidr`] for the first entry that is not a CIDR.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self, ConfigError> {
        Ok(Self {
            include: parse_nets(include)?,
            exclude: parse_nets(exclude)?,
        })
    }

    /// True when at least one network is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.include.is_empty() || !self.exclude.is_empty()
    }

    /// Check an address. Exclusions win over inclusions.
    #[must_use]
    pub fn check(&self, ip: IpAddr) -> TargetVerdict {
        if let Some(net) = self.exclude.iter().find(|net| net.contains(&ip)) {
            return TargetVerdict::Excluded(*net);
        }
        if !self.include.is_empty() && !self.include.iter().any(|net| net.contains(&ip)) {
            return TargetVerdict::NotIncluded;
        }
        TargetVerdict::Keep
    }

    /// True if `target` passes the filter. Targets that are not IP addresses always pass.
    #[must_use]
    pub fn matches(&self, target: &str) -> bool {
        target
            .parse::<IpAddr>()
            .map_or(true, |ip| self.check(ip) == TargetVerdict::Keep)
    }
}

fn parse_nets<S: AsRef<str>>(cidrs: &[S]) -> Result<Vec<IpNet>, ConfigError> {
    cidrs
        .iter()
        .map(|c| c.as_ref().trim())
        .filter(|c| !c.is_empty())
        .map(|c| {
            c.parse::<IpNet>().map_err(|e| ConfigError::InvalidCidr {
                cidr: c.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum PatternKind {
    Exact(String),
    /// Stored with its leading dot, e.g. `.example.com` for `*.example.com`
    Wildcard(String),
}

/// A DNS name exclusion pattern.
///
/// Either an exact name or `*.` followed by a suffix. The wildcard stands for
/// one or more labels, so `*.example.com` matches `a.example.com` and
/// `a.b.example.com` but not `example.com` itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainPattern {
    raw: String,
    kind: PatternKind,
}

impl DomainPattern {
    /// Parse a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDomainPattern`] if the pattern is empty or
    /// uses a wildcard anywhere but as the whole leading label.
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidDomainPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let normalized = normalize_name(pattern);
        if normalized.is_empty() {
            return Err(invalid("pattern is empty"));
        }

        let kind = match normalized.strip_prefix("*.") {
            Some(suffix) if suffix.is_empty() => {
                return Err(invalid("wildcard needs a parent domain"));
            }
            Some(suffix) if suffix.contains('*') => {
                return Err(invalid("only a single leading wildcard is supported"));
            }
            Some(suffix) => PatternKind::Wildcard(format!(".{suffix}")),
            None if normalized.contains('*') => {
                return Err(invalid("wildcard is only allowed as the leading label"));
            }
            None => PatternKind::Exact(normalized.clone()),
        };

        Ok(Self {
            raw: pattern.trim().to_string(),
            kind,
        })
    }

    /// Case-insensitive match, ignoring a trailing dot on `dns_name`.
    #[must_use]
    pub fn matches(&self, dns_name: &str) -> bool {
        let name = normalize_name(dns_name);
        match &self.kind {
            PatternKind::Exact(exact) => name == *exact,
            PatternKind::Wildcard(suffix) => name
                .strip_suffix(suffix.as_str())
                .is_some_and(|prefix| !prefix.is_empty()),
        }
    }
}

impl fmt::Display for DomainPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    trimmed
        .strip_suffix('.')
        .unwrap_or(trimmed)
        .to_ascii_lowercase()
}

/// A set of DNS name exclusion patterns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DomainExclusions(Vec<DomainPattern>);

impl DomainExclusions {
    /// Parse a list of patterns. Blank entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::InvalidDomainPattern`] encountered.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        patterns
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| !p.trim().is_empty())
            .map(DomainPattern::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// True when no pattern is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first pattern matching `dns_name`, if any.
    #[must_use]
    pub fn matching(&self, dns_name: &str) -> Option<&DomainPattern> {
        self.0.iter().find(|p| p.matches(dns_name))
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod filter_tests;

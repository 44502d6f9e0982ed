// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Normalized candidate DNS records ("endpoints").
//!
//! Every resource adapter translates its cluster resources into [`Endpoint`]
//! values. Endpoints are created fresh on every reconciliation pass, flow
//! through [`crate::merge::merge_endpoints`] and the wrappers in
//! [`crate::wrappers`], and are then handed to the provider layer.
//!
//! # Example
//!
//! ```rust
//! use dnsource::endpoint::{Endpoint, RecordType};
//!
//! let ep = Endpoint::new("www.example.com.", RecordType::A, ["192.0.2.1"])
//!     .unwrap()
//!     .with_set_identifier("eu-west-1");
//!
//! assert_eq!(ep.dns_name, "www.example.com");
//! assert_eq!(ep.key().set_identifier, "eu-west-1");
//! ```

use crate::constants::{MAX_DNS_LABEL_LENGTH, PROVIDER_SPECIFIC_ALIAS, TARGET_SEPARATOR};
use crate::errors::EndpointError;
use crate::labels::OWNER_LABEL_KEY;
use crate::merge::MergeKey;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

/// DNS record type of an endpoint.
///
/// The record type decides merge eligibility (CNAME is the only type that
/// cannot hold several targets) and which target format is legal.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address record
    #[default]
    A,
    /// IPv6 address record
    Aaaa,
    /// Canonical name (alias) record
    Cname,
    /// Text record
    Txt,
    /// Service locator record
    Srv,
    /// Name server record
    Ns,
    /// Pointer record
    Ptr,
    /// Mail exchange record
    Mx,
    /// Naming authority pointer record
    Naptr,
}

impl RecordType {
    /// All supported record types.
    pub const ALL: [RecordType; 9] = [
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Cname,
        RecordType::Txt,
        RecordType::Srv,
        RecordType::Ns,
        RecordType::Ptr,
        RecordType::Mx,
        RecordType::Naptr,
    ];

    /// The mnemonic used in zone files and provider APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Txt => "TXT",
            RecordType::Srv => "SRV",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Mx => "MX",
            RecordType::Naptr => "NAPTR",
        }
    }

    /// Whether targets of this type are IP addresses.
    #[must_use]
    pub const fn is_address(self) -> bool {
        matches!(self, RecordType::A | RecordType::Aaaa)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::ALL
            .into_iter()
            .find(|rt| rt.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| EndpointError::UnknownRecordType(s.to_string()))
    }
}

/// TTL of a DNS record in seconds. Zero means "not configured".
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    JsonSchema,
)]
#[serde(transparent)]
pub struct Ttl(pub i64);

impl Ttl {
    /// Returns true when an explicit TTL was set.
    #[must_use]
    pub const fn is_configured(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The targets (IP addresses or hostnames) a record points to.
///
/// Semantically a set, represented as an ordered list so that output stays
/// deterministic once [`Targets::normalized`] has been applied.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct Targets(pub Vec<String>);

impl Targets {
    /// Build a target list from anything yielding strings.
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Targets(targets.into_iter().map(Into::into).collect())
    }

    /// Number of targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no targets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deduplicated, lexicographically sorted copy of the targets.
    #[must_use]
    pub fn normalized(&self) -> Targets {
        Targets(crate::merge::normalize_targets(self.0.clone()))
    }

    /// Order-insensitive comparison.
    ///
    /// Hostnames compare case-insensitively; IP addresses compare by value, so
    /// `2001:db8::1` and `2001:0db8:0:0:0:0:0:1` are the same target.
    #[must_use]
    pub fn same(&self, other: &Targets) -> bool {
        if self.len() != other.len() {
            return false;
        }
        canonical_targets(self) == canonical_targets(other)
    }
}

fn canonical_targets(targets: &Targets) -> Vec<String> {
    let mut canonical: Vec<String> = targets
        .iter()
        .map(|t| match t.parse::<IpAddr>() {
            Ok(ip) => ip.to_string(),
            Err(_) => t.to_ascii_lowercase(),
        })
        .collect();
    canonical.sort_unstable();
    canonical
}

impl Deref for Targets {
    type Target = Vec<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Targets {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<String>> for Targets {
    fn from(targets: Vec<String>) -> Self {
        Targets(targets)
    }
}

impl fmt::Display for Targets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(TARGET_SEPARATOR))
    }
}

/// A routing hint understood by one DNS provider only.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct ProviderSpecificProperty {
    /// Property name (e.g. `aws/geolocation-continent-code`)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Property value
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
}

/// Ordered provider-specific properties of an endpoint.
pub type ProviderSpecific = Vec<ProviderSpecificProperty>;

/// Bookkeeping labels attached to an endpoint.
pub type Labels = BTreeMap<String, String>;

/// A candidate DNS record.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// The hostname of the DNS record
    pub dns_name: String,

    /// The targets the DNS record points to
    #[serde(default, skip_serializing_if = "Targets::is_empty")]
    pub targets: Targets,

    /// Type of record, e.g. CNAME, A, AAAA, SRV, TXT
    pub record_type: RecordType,

    /// Distinguishes multiple record sets sharing name and type
    /// (e.g. weighted routing policies)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub set_identifier: String,

    /// TTL for the record
    #[serde(default, rename = "recordTTL", skip_serializing_if = "is_unset_ttl")]
    pub record_ttl: Ttl,

    /// Labels defined for the endpoint
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,

    /// Provider-specific configuration
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provider_specific: ProviderSpecific,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_unset_ttl(ttl: &Ttl) -> bool {
    !ttl.is_configured()
}

impl Endpoint {
    /// Create an endpoint without an explicit TTL.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::LabelTooLong`] if a label of `dns_name` exceeds 63 octets.
    pub fn new<I, S>(dns_name: &str, record_type: RecordType, targets: I) -> Result<Self, EndpointError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_ttl(dns_name, record_type, Ttl::default(), targets)
    }

    /// Create an endpoint with a TTL.
    ///
    /// A single trailing dot is trimmed from the name and from every target.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::LabelTooLong`] if a label of `dns_name` exceeds 63 octets.
    pub fn with_ttl<I, S>(
        dns_name: &str,
        record_type: RecordType,
        ttl: Ttl,
        targets: I,
    ) -> Result<Self, EndpointError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(label) = dns_name
            .split('.')
            .find(|label| label.len() > MAX_DNS_LABEL_LENGTH)
        {
            return Err(EndpointError::LabelTooLong {
                label: label.to_string(),
                dns_name: dns_name.to_string(),
            });
        }

        let targets = targets
            .into_iter()
            .map(|t| trim_trailing_dot(t.as_ref()).to_string())
            .collect();

        Ok(Endpoint {
            dns_name: trim_trailing_dot(dns_name).to_string(),
            targets: Targets(targets),
            record_type,
            record_ttl: ttl,
            ..Default::default()
        })
    }

    /// Apply a set identifier.
    #[must_use]
    pub fn with_set_identifier(mut self, set_identifier: impl Into<String>) -> Self {
        self.set_identifier = set_identifier.into();
        self
    }

    /// Add or update a label.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Attach a provider-specific property.
    #[must_use]
    pub fn with_provider_specific(mut self, name: &str, value: &str) -> Self {
        self.set_provider_specific_property(name, value);
        self
    }

    /// Value of a provider-specific property, if present.
    #[must_use]
    pub fn provider_specific_property(&self, name: &str) -> Option<&str> {
        self.provider_specific
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Set a provider-specific property, replacing an existing one in place.
    pub fn set_provider_specific_property(&mut self, name: &str, value: &str) {
        if let Some(existing) = self.provider_specific.iter_mut().find(|p| p.name == name) {
            existing.value = value.to_string();
            return;
        }
        self.provider_specific.push(ProviderSpecificProperty {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    /// Remove a provider-specific property.
    pub fn delete_provider_specific_property(&mut self, name: &str) {
        self.provider_specific.retain(|p| p.name != name);
    }

    /// The identity under which this endpoint may be merged with others.
    #[must_use]
    pub fn key(&self) -> MergeKey {
        MergeKey {
            dns_name: self.dns_name.clone(),
            record_type: self.record_type,
            set_identifier: self.set_identifier.clone(),
            record_ttl: self.record_ttl,
        }
    }

    /// True if the owner label matches `owner_id`.
    #[must_use]
    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.labels
            .get(OWNER_LABEL_KEY)
            .is_some_and(|owner| owner == owner_id)
    }

    /// Check that the targets are well formed for MX and SRV records.
    ///
    /// MX targets must read `"<preference> <host>"` and SRV targets
    /// `"<priority> <weight> <port> <host>"`, each number fitting in a `u16`.
    /// Other record types always pass.
    #[must_use]
    pub fn check_endpoint(&self) -> bool {
        match self.record_type {
            RecordType::Mx => self.targets.iter().all(|t| valid_mx_target(t)),
            RecordType::Srv => self.targets.iter().all(|t| valid_srv_target(t)),
            _ => true,
        }
    }

    /// Check the trailing-dot rules for targets.
    ///
    /// NAPTR targets must end with a dot, TXT and MX are exempt, every other
    /// type must not end with a dot.
    #[must_use]
    pub fn has_valid_target_format(&self) -> bool {
        match self.record_type {
            RecordType::Txt | RecordType::Mx => true,
            RecordType::Naptr => self.targets.iter().all(|t| t.ends_with('.')),
            _ => self.targets.iter().all(|t| !t.ends_with('.')),
        }
    }

    /// False when the endpoint asks for a provider alias on a record type that
    /// cannot be aliased.
    #[must_use]
    pub fn supports_alias(&self) -> bool {
        let wants_alias = self
            .provider_specific_property(PROVIDER_SPECIFIC_ALIAS)
            .is_some_and(|v| v == "true");
        !wants_alias
            || matches!(
                self.record_type,
                RecordType::A | RecordType::Aaaa | RecordType::Cname
            )
    }
}

fn trim_trailing_dot(s: &str) -> &str {
    s.strip_suffix('.').unwrap_or(s)
}

fn valid_mx_target(target: &str) -> bool {
    let parts: Vec<&str> = target.split_whitespace().collect();
    parts.len() == 2 && parts[0].parse::<u16>().is_ok()
}

fn valid_srv_target(target: &str) -> bool {
    let parts: Vec<&str> = target.split_whitespace().collect();
    parts.len() == 4 && parts[..3].iter().all(|p| p.parse::<u16>().is_ok())
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let provider_specific: Vec<String> = self
            .provider_specific
            .iter()
            .map(|p| format!("{}={}", p.name, p.value))
            .collect();
        write!(
            f,
            "{} {} IN {} {} {} [{}]",
            self.dns_name,
            self.record_ttl,
            self.record_type,
            self.set_identifier,
            self.targets,
            provider_specific.join(",")
        )
    }
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod endpoint_tests;

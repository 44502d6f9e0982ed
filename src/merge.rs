// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Endpoint deduplication and merge.
//!
//! Adapters for different resource kinds routinely produce overlapping
//! candidates for the same DNS name: two services behind one hostname, an
//! ingress and a route sharing a host, and so on. [`merge_endpoints`] converges
//! such a batch into one consistent record set:
//!
//! - candidates are grouped by [`MergeKey`] (name, type, set identifier, TTL);
//! - non-CNAME groups collapse into one endpoint carrying the union of all
//!   targets, deduplicated and sorted;
//! - CNAME groups collapse only when every member agrees on the single target.
//!   Conflicting CNAMEs are kept as separate records and reported with a
//!   warning, since a name may hold only one CNAME (RFC 1035);
//! - CNAMEs without any target are dropped.
//!
//! The merge never fails. A conflicting or malformed group is resolved by the
//! rules above and surfaced through logs and metrics only, so one bad resource
//! cannot block DNS updates for unrelated names.
//!
//! # Example
//!
//! ```rust
//! use dnsource::endpoint::{Endpoint, RecordType};
//! use dnsource::merge::merge_endpoints;
//!
//! let merged = merge_endpoints(vec![
//!     Endpoint::new("example.com", RecordType::A, ["3.3.3.3"]).unwrap(),
//!     Endpoint::new("example.com", RecordType::A, ["1.1.1.1", "3.3.3.3"]).unwrap(),
//! ]);
//!
//! assert_eq!(merged.len(), 1);
//! assert_eq!(merged[0].targets.to_string(), "1.1.1.1;3.3.3.3");
//! ```

use crate::constants::DROP_REASON_EMPTY_CNAME;
use crate::endpoint::{Endpoint, RecordType, Targets, Ttl};
use crate::metrics;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Identity under which two endpoints are considered the same record.
///
/// Labels and provider-specific properties do not take part in the key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MergeKey {
    /// Record owner name
    pub dns_name: String,
    /// Record type
    pub record_type: RecordType,
    /// Routing-policy set identifier (empty when unused)
    pub set_identifier: String,
    /// Explicit TTL; endpoints with different TTLs are never merged
    pub record_ttl: Ttl,
}

/// Deduplicate and sort a list of targets.
///
/// Ordering is plain lexicographic over the raw strings and exists only to
/// make output deterministic; `10.0.0.2` sorts before `9.0.0.1`.
#[must_use]
pub fn normalize_targets(mut targets: Vec<String>) -> Vec<String> {
    targets.sort_unstable();
    targets.dedup();
    targets
}

/// Merge a batch of candidate endpoints into a conflict-resolved record set.
///
/// An empty input is handed back untouched, so a never-allocated vector stays
/// unallocated and a pre-sized empty one keeps its capacity. Otherwise the
/// output holds one entry per merge key, in the order keys were first seen,
/// except for conflicting CNAME groups which keep every distinct candidate.
#[must_use]
pub fn merge_endpoints(endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
    if endpoints.is_empty() {
        return endpoints;
    }

    let mut positions: HashMap<MergeKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<Endpoint>> = Vec::new();

    for ep in endpoints {
        match positions.entry(ep.key()) {
            Entry::Occupied(slot) => groups[*slot.get()].push(ep),
            Entry::Vacant(slot) => {
                slot.insert(groups.len());
                groups.push(vec![ep]);
            }
        }
    }

    let mut merged = Vec::with_capacity(groups.len());
    for group in groups {
        let is_cname = group
            .first()
            .is_some_and(|ep| ep.record_type == RecordType::Cname);
        if is_cname {
            merge_cname_group(group, &mut merged);
        } else {
            merged.extend(merge_group(group));
        }
    }

    metrics::record_endpoints_merged(merged.len());
    merged
}

/// Union the targets of a group sharing one merge key. Every non-target field
/// is taken from the first member.
fn merge_group(group: Vec<Endpoint>) -> Option<Endpoint> {
    let mut members = group.into_iter();
    let mut merged = members.next()?;

    let mut targets = std::mem::take(&mut merged.targets).0;
    for member in members {
        targets.extend(member.targets.0);
    }
    merged.targets = Targets(normalize_targets(targets));

    Some(merged)
}

fn merge_cname_group(group: Vec<Endpoint>, out: &mut Vec<Endpoint>) {
    let targets = normalize_targets(
        group
            .iter()
            .flat_map(|ep| ep.targets.iter().cloned())
            .collect(),
    );

    match targets.len() {
        0 => {
            for ep in &group {
                skip_empty_cname(ep);
            }
        }
        1 => {
            // metadata comes from the first member that contributed the target
            let mut base = None;
            for ep in group {
                if ep.targets.is_empty() {
                    skip_empty_cname(&ep);
                } else if base.is_none() {
                    base = Some(ep);
                }
            }
            if let Some(mut merged) = base {
                merged.targets = Targets(targets);
                out.push(merged);
            }
        }
        _ => {
            let dns_name = group
                .first()
                .map(|ep| ep.dns_name.clone())
                .unwrap_or_default();
            let conflicting: Vec<String> = targets
                .iter()
                .map(|t| format!("{} {t}", RecordType::Cname))
                .collect();
            warn!(
                dns_name = %dns_name,
                "Only one CNAME per name is allowed; keeping conflicting records for {}: [{}]",
                dns_name,
                conflicting.join(", ")
            );
            metrics::record_cname_conflict();

            let mut distinct: Vec<Endpoint> = Vec::new();
            for mut ep in group {
                if ep.targets.is_empty() {
                    skip_empty_cname(&ep);
                    continue;
                }
                ep.targets = ep.targets.normalized();
                if !distinct.contains(&ep) {
                    distinct.push(ep);
                }
            }
            out.extend(distinct);
        }
    }
}

fn skip_empty_cname(ep: &Endpoint) {
    debug!(
        dns_name = %ep.dns_name,
        "Skipping CNAME endpoint {} without targets",
        ep.dns_name
    );
    metrics::record_endpoint_dropped(DROP_REASON_EMPTY_CNAME);
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod merge_tests;

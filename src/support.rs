//! Identity support records and their per-endpoint aggregation

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Placeholder for a bucket no record filled
pub const NOT_AVAILABLE: &str = "N/A";

/// An API endpoint page discovered in the table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointRef {
    pub name: String,
    pub url: String,
}

/// Name-keyed, insertion-ordered endpoint collection.
///
/// Re-inserting a name overwrites its URL but keeps its original position.
#[derive(Debug, Default, Clone)]
pub struct EndpointSet {
    entries: Vec<EndpointRef>,
    index: HashMap<String, usize>,
}

impl EndpointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, url: String) {
        match self.index.get(&name) {
            Some(&i) => self.entries[i].url = url,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push(EndpointRef { name, url });
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&EndpointRef> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointRef> {
        self.entries.iter()
    }
}

/// One row of an endpoint's support table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityRecord {
    pub endpoint_name: String,
    pub endpoint_url: String,
    pub identity_type: String,
    pub support_text: String,
}

/// Bucket an identity type falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    User,
    ServicePrincipalOrManagedIdentity,
    Unknown,
}

/// Classify the raw identity type text of a support table row.
/// "User" is checked first, matching is case-sensitive.
pub fn classify(identity_type: &str) -> IdentityKind {
    if identity_type.contains("User") {
        IdentityKind::User
    } else if identity_type.contains("Service principal")
        || identity_type.contains("Managed identities")
    {
        IdentityKind::ServicePrincipalOrManagedIdentity
    } else {
        IdentityKind::Unknown
    }
}

/// Two-column view of one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointSummary {
    pub endpoint: String,
    pub url: String,
    pub user_support: String,
    pub service_principal_support: String,
}

/// Identity type that matched neither bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnclassifiedRow {
    pub endpoint: String,
    pub identity_type: String,
}

/// Result of [`aggregate`]
#[derive(Debug, Default, Serialize)]
pub struct Aggregation {
    /// One row per endpoint with at least one record, sorted by name
    pub summaries: Vec<EndpointSummary>,
    pub unclassified: Vec<UnclassifiedRow>,
}

/// Group records by endpoint, preserving record order within each group
pub fn group_by_endpoint(records: &[IdentityRecord]) -> BTreeMap<&str, Vec<&IdentityRecord>> {
    let mut groups: BTreeMap<&str, Vec<&IdentityRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.endpoint_name.as_str())
            .or_default()
            .push(record);
    }
    groups
}

/// Reduce records to one summary per endpoint. Last matching record wins.
pub fn aggregate(records: &[IdentityRecord]) -> Aggregation {
    let mut out = Aggregation::default();

    for (endpoint, items) in group_by_endpoint(records) {
        let mut user_support: &str = NOT_AVAILABLE;
        let mut sp_support: &str = NOT_AVAILABLE;

        for item in &items {
            match classify(&item.identity_type) {
                IdentityKind::User => user_support = item.support_text.as_str(),
                IdentityKind::ServicePrincipalOrManagedIdentity => {
                    sp_support = item.support_text.as_str()
                }
                IdentityKind::Unknown => out.unclassified.push(UnclassifiedRow {
                    endpoint: endpoint.to_string(),
                    identity_type: item.identity_type.clone(),
                }),
            }
        }

        out.summaries.push(EndpointSummary {
            endpoint: endpoint.to_string(),
            url: items[0].endpoint_url.clone(),
            user_support: user_support.to_string(),
            service_principal_support: sp_support.to_string(),
        });
    }

    out
}

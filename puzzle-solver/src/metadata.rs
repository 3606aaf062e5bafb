//! Serializable description of everything the registry can run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All collections, grouped by year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub collections: BTreeMap<u16, Vec<CollectionMetadata>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMetadata {
    pub source: String,
    pub year: u16,
    /// Sets per author, ordered by release time
    pub authors: BTreeMap<String, Vec<ProblemSetMetadata>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSetMetadata {
    pub name: String,
    pub author: String,
    pub release_time: DateTime<Utc>,
    pub problems: Vec<ProblemMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemMetadata {
    pub name: String,
    pub description: Option<String>,
}

impl Snapshot {
    /// Total number of problem sets across all collections
    pub fn set_count(&self) -> usize {
        self.collections
            .values()
            .flatten()
            .flat_map(|c| c.authors.values())
            .map(Vec::len)
            .sum()
    }
}

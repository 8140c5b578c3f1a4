//! Identifiers and the graph side-table.
//!
//! Every builder execution produces one [`GraphRecord`]: which fixture it
//! cloned (at most one) and which fixtures it embedded (ordered, distinct).
//! The [`NodeStore`] keeps the record of the most recent execution per id.

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Opaque fixture identifier (e.g. `Test01Base1`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataId(String);

impl DataId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DataId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DataId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&DataId> for DataId {
    fn from(id: &DataId) -> Self {
        id.clone()
    }
}

impl Borrow<str> for DataId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DataId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for DataId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for DataId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Composition edges observed during one execution of a builder.
///
/// Serialized with the field names the force-graph explorer reads:
/// `dataId`, `inheritDataId` (omitted when there is no parent) and
/// `properties`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphRecord {
    pub data_id: DataId,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub inherit_data_id: Option<DataId>,
    #[serde(default)]
    pub properties: Vec<DataId>,
}

impl GraphRecord {
    pub fn new(data_id: DataId) -> Self {
        Self {
            data_id,
            inherit_data_id: None,
            properties: Vec::new(),
        }
    }

    /// Record the inheritance edge. A later call replaces an earlier one.
    pub fn set_inherit(&mut self, parent: DataId) {
        self.inherit_data_id = Some(parent);
    }

    /// Record a containment edge, keeping first-seen order.
    ///
    /// Returns `false` when `child` was already listed.
    pub fn add_property(&mut self, child: DataId) -> bool {
        if self.properties.contains(&child) {
            return false;
        }
        self.properties.push(child);
        true
    }
}

// Older exporters wrote `"inheritDataId": ""` for records without a parent.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<DataId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(DataId::from))
}

/// Last-write-wins store of graph records, keyed (and iterated) by id.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    records: BTreeMap<DataId, GraphRecord>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any earlier record for the same id.
    pub fn insert(&mut self, record: GraphRecord) -> Option<GraphRecord> {
        self.records.insert(record.data_id.clone(), record)
    }

    pub fn get(&self, id: &str) -> Option<&GraphRecord> {
        self.records.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GraphRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_vec(&self) -> Vec<GraphRecord> {
        self.records.values().cloned().collect()
    }
}

//! Data model shared by the index, the reconciler and the presenters
//!
//! Zones and record names are plain strings. IP sets are kept sorted and
//! deduplicated at all times so that equality checks and rendered diffs are
//! stable across runs.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Zone identifier as known by the zone API
pub type Zone = String;

/// Record name within a zone (usually a hostname)
pub type RecordName = String;

/// The server's IP-centric view of a zone: `IP -> [RecordName]`
pub type NativeMapping = BTreeMap<String, Vec<RecordName>>;

/// Name-centric view of a single zone: `RecordName -> IpSet`
pub type ZoneRecords = BTreeMap<RecordName, IpSet>;

/// Name-centric view over several zones: `Zone -> RecordName -> IpSet`
pub type StateMap = BTreeMap<Zone, ZoneRecords>;

/// Sorted, deduplicated set of string-encoded IP addresses
///
/// Ordering is plain string ordering, which is what the rendered diffs and the
/// apply sequence follow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IpSet(BTreeSet<String>);

impl IpSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of addresses in the set
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the set holds no address
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the addresses in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Addresses in either set
    pub fn union(&self, other: &IpSet) -> IpSet {
        IpSet(self.0.union(&other.0).cloned().collect())
    }

    /// Addresses in `self` but not in `other`
    pub fn difference(&self, other: &IpSet) -> IpSet {
        IpSet(self.0.difference(&other.0).cloned().collect())
    }

    /// Addresses in both sets
    pub fn intersection(&self, other: &IpSet) -> IpSet {
        IpSet(self.0.intersection(&other.0).cloned().collect())
    }

    /// Sorted addresses as an owned vector
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for IpSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        IpSet(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a IpSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for IpSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.to_vec().join(", "))
    }
}

/// Presence intent for a record or zone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    /// The given addresses must be assigned to the record
    #[default]
    Present,
    /// The given addresses (or the whole zone) must be gone
    Absent,
}

impl State {
    /// Lowercase name as used on the command line and in task files
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Present => "present",
            State::Absent => "absent",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(State::Present),
            "absent" => Ok(State::Absent),
            other => Err(crate::Error::invalid_argument(format!(
                "Unrecognized value in argument 'state': {}",
                other
            ))),
        }
    }
}

//! Name-centric index over a zone's native mapping
//!
//! The zone API reports zones as `IP -> [RecordName]`. Reconciliation needs
//! the inverse, `RecordName -> [IP]`, to look up the addresses currently
//! assigned to a record.

use crate::model::{IpSet, NativeMapping, RecordName, ZoneRecords};
use std::collections::BTreeMap;

/// Reverse a native mapping into `RecordName -> [IP]`
///
/// Addresses are appended in sorted IP-key order, since [`NativeMapping`] is
/// a `BTreeMap`; the server's own key order is not preserved. Duplicates in
/// the source are kept; callers normalize through [`IpSet`].
pub fn reverse(native: &NativeMapping) -> BTreeMap<RecordName, Vec<String>> {
    let mut by_name: BTreeMap<RecordName, Vec<String>> = BTreeMap::new();
    for (ip, names) in native {
        for name in names {
            by_name.entry(name.clone()).or_default().push(ip.clone());
        }
    }
    by_name
}

/// Reversed view of one zone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordIndex {
    by_name: BTreeMap<RecordName, Vec<String>>,
}

impl RecordIndex {
    /// Build the index from a zone's native mapping
    pub fn build(native: &NativeMapping) -> Self {
        Self {
            by_name: reverse(native),
        }
    }

    /// Index of a zone with no records (new or unknown zone)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Addresses currently assigned to `record`; empty if the record is unknown
    pub fn lookup(&self, record: &str) -> IpSet {
        self.by_name
            .get(record)
            .map(|ips| ips.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Every record of the zone with its normalized address set
    pub fn records(&self) -> ZoneRecords {
        self.by_name
            .iter()
            .map(|(name, ips)| (name.clone(), ips.iter().cloned().collect()))
            .collect()
    }

    /// Raw, unnormalized addresses for `record`
    pub fn raw(&self, record: &str) -> Option<&[String]> {
        self.by_name.get(record).map(Vec::as_slice)
    }

    /// True if the zone has no records
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

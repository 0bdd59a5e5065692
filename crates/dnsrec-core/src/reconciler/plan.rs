//! Pure planning step
//!
//! Turns an [`Observation`] and a [`DesiredIntent`] into the observed state
//! (`got`), the target state (`wanted`), per-zone deltas and the `changed`
//! flag. Nothing here performs I/O, so every decision the reconciler makes can
//! be checked without a server.

use crate::diff::prune_state;
use crate::index::RecordIndex;
use crate::intent::DesiredIntent;
use crate::model::{IpSet, RecordName, State, StateMap, Zone};
use serde::Serialize;
use tracing::debug;

/// What was read from the server for one zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneObservation {
    /// Zone identifier
    pub zone: Zone,
    /// Reversed record index of the zone
    pub index: RecordIndex,
}

impl ZoneObservation {
    /// Observation of a zone listed by the server
    pub fn existing(zone: impl Into<Zone>, index: RecordIndex) -> Self {
        Self {
            zone: zone.into(),
            index,
        }
    }

    /// Observation of a zone the server does not know yet
    pub fn new_zone(zone: impl Into<Zone>) -> Self {
        Self {
            zone: zone.into(),
            index: RecordIndex::empty(),
        }
    }
}

/// Observed zones, in the order they will be reconciled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    pub zones: Vec<ZoneObservation>,
}

/// One mutating call against the zone API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// `POST /zones/{zone}/{ip}/{record}`
    AddRecord {
        zone: Zone,
        ip: String,
        record: RecordName,
    },
    /// `DELETE /zones/{zone}/{ip}/{record}`
    RemoveRecord {
        zone: Zone,
        ip: String,
        record: RecordName,
    },
    /// `DELETE /zones/{zone}`
    RemoveZone { zone: Zone },
}

/// Changes needed for one zone/record pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ZoneDelta {
    pub zone: Zone,
    /// `None` for zone-level removal
    pub record: Option<RecordName>,
    pub to_add: IpSet,
    pub to_remove: IpSet,
    pub zone_removal: bool,
}

impl ZoneDelta {
    /// True if applying the delta would not call the API
    pub fn is_empty(&self) -> bool {
        !self.zone_removal && self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// API calls for this delta: zone removal alone, otherwise adds then
    /// removes, each in sorted address order
    pub fn operations(&self) -> Vec<Operation> {
        if self.zone_removal {
            return vec![Operation::RemoveZone {
                zone: self.zone.clone(),
            }];
        }

        let Some(record) = &self.record else {
            return Vec::new();
        };

        let adds = self.to_add.iter().map(|ip| Operation::AddRecord {
            zone: self.zone.clone(),
            ip: ip.to_string(),
            record: record.clone(),
        });
        let removes = self.to_remove.iter().map(|ip| Operation::RemoveRecord {
            zone: self.zone.clone(),
            ip: ip.to_string(),
            record: record.clone(),
        });
        adds.chain(removes).collect()
    }
}

/// Result of planning one intent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Observed state, restricted to what the intent touches
    pub got: StateMap,
    /// Target state
    pub wanted: StateMap,
    /// Per zone/record deltas, in zone order
    pub deltas: Vec<ZoneDelta>,
    /// `pruned(got) != pruned(wanted)`
    pub changed: bool,
}

impl Plan {
    /// API calls needed to converge; empty when nothing changed
    pub fn operations(&self) -> Vec<Operation> {
        if !self.changed {
            return Vec::new();
        }
        self.deltas.iter().flat_map(ZoneDelta::operations).collect()
    }

    /// Target address set for `record` in `zone`
    pub fn wanted_ips(&self, zone: &str, record: &str) -> Option<&IpSet> {
        self.wanted.get(zone).and_then(|records| records.get(record))
    }

}

/// Compute observed state, target state and deltas for `intent`
///
/// The intent is expected to have passed [`DesiredIntent::validate`].
pub fn plan(intent: &DesiredIntent, observation: &Observation) -> Plan {
    let wanted_ips = intent.wanted_ips();
    let mut got = StateMap::new();
    let mut wanted = StateMap::new();
    let mut deltas = Vec::new();

    for observed in &observation.zones {
        let zone = &observed.zone;

        match intent.record.as_deref() {
            _ if intent.is_zone_removal() => {
                let records = observed.index.records();
                debug!(
                    "Zone {} targeted for removal ({} record(s))",
                    zone,
                    records.len()
                );
                deltas.push(ZoneDelta {
                    zone: zone.clone(),
                    record: None,
                    zone_removal: !observed.index.is_empty(),
                    ..Default::default()
                });
                got.insert(zone.clone(), records);
            }
            None => {
                debug!("No record given for zone {}, nothing to plan", zone);
            }
            Some(record) => {
                let current = observed.index.lookup(record);
                let (target, to_remove) = match intent.state {
                    State::Present => (current.union(&wanted_ips), IpSet::new()),
                    State::Absent => (
                        current.difference(&wanted_ips),
                        current.intersection(&wanted_ips),
                    ),
                };
                let to_add = target.difference(&current);

                debug!(
                    "Zone {} record {}: got {} wanted {}",
                    zone, record, current, target
                );

                deltas.push(ZoneDelta {
                    zone: zone.clone(),
                    record: Some(record.to_string()),
                    to_add,
                    to_remove,
                    zone_removal: false,
                });
                got.entry(zone.clone())
                    .or_default()
                    .insert(record.to_string(), current);
                wanted
                    .entry(zone.clone())
                    .or_default()
                    .insert(record.to_string(), target);
            }
        }
    }

    let changed = prune_state(&got) != prune_state(&wanted);

    Plan {
        got,
        wanted,
        deltas,
        changed,
    }
}

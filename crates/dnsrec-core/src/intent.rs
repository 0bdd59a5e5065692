//! Desired intent for one reconciliation
//!
//! An intent names an optional zone, an optional record, the addresses that
//! should (or should not) be assigned to it, and whether they must be present
//! or absent. Leaving the record out of an `absent` intent targets the whole
//! zone.
//!
//! Task files may spell `value` as a single scalar or as a sequence, and
//! scalars may be numbers; everything is normalized to strings on load.

use crate::error::{Error, Result};
use crate::model::{IpSet, RecordName, State, Zone};
use serde::{Deserialize, Deserializer, Serialize};
use std::net::Ipv4Addr;

/// What the caller wants the zone API to look like afterwards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredIntent {
    /// Zone to operate on; `None` means every zone the server lists
    #[serde(default)]
    pub zone: Option<Zone>,

    /// Record name; `None` only for whole-zone removal
    #[serde(default, deserialize_with = "deserialize_record")]
    pub record: Option<RecordName>,

    /// Requested addresses, in the order given
    #[serde(default, rename = "value", deserialize_with = "deserialize_values")]
    pub values: Vec<String>,

    /// Presence intent
    #[serde(default)]
    pub state: State,
}

impl DesiredIntent {
    /// Intent to assign `values` to `record` in `zone`
    pub fn present(zone: impl Into<Zone>, record: impl Into<RecordName>) -> Self {
        Self {
            zone: Some(zone.into()),
            record: Some(record.into()),
            values: Vec::new(),
            state: State::Present,
        }
    }

    /// Intent to drop `values` from `record`, in `zone` or in every zone
    pub fn absent(zone: Option<Zone>, record: impl Into<RecordName>) -> Self {
        Self {
            zone,
            record: Some(record.into()),
            values: Vec::new(),
            state: State::Absent,
        }
    }

    /// Intent to delete a whole zone
    pub fn remove_zone(zone: impl Into<Zone>) -> Self {
        Self {
            zone: Some(zone.into()),
            record: None,
            values: Vec::new(),
            state: State::Absent,
        }
    }

    /// Set the requested addresses
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    /// True when the intent deletes the zone instead of touching one record
    pub fn is_zone_removal(&self) -> bool {
        self.state == State::Absent && self.record.is_none()
    }

    /// Requested addresses, sorted and deduplicated
    pub fn wanted_ips(&self) -> IpSet {
        self.values.iter().map(|v| v.trim()).collect()
    }

    /// Check the preconditions that must hold before any API call
    pub fn validate(&self) -> Result<()> {
        if self.zone.as_deref().is_some_and(|z| z.trim().is_empty()) {
            return Err(Error::invalid_argument("Argument 'zone' cannot be empty"));
        }

        if self.record.as_deref().is_some_and(|r| r.trim().is_empty()) {
            return Err(Error::invalid_argument("Argument 'record' cannot be empty"));
        }

        match self.state {
            State::Present => {
                if self.zone.is_none() {
                    return Err(Error::invalid_argument(
                        "Can't add records without a zone given",
                    ));
                }
                if self.record.is_none() {
                    return Err(Error::invalid_argument(
                        "Can't add records without a record name given",
                    ));
                }
            }
            State::Absent => {
                if self.record.is_none() && self.zone.is_none() {
                    return Err(Error::invalid_argument(
                        "Removing a whole zone requires argument 'zone'",
                    ));
                }
            }
        }

        for value in &self.values {
            if value.trim().parse::<Ipv4Addr>().is_err() {
                return Err(Error::invalid_argument(format!(
                    "Value '{}' is not an IPv4 address",
                    value
                )));
            }
        }

        Ok(())
    }
}

/// Scalar accepted where a string is expected
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Scalar>),
    One(Scalar),
}

fn deserialize_values<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value.into_string()],
        Some(OneOrMany::Many(values)) => values.into_iter().map(Scalar::into_string).collect(),
    })
}

fn deserialize_record<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_requires_zone() {
        let mut intent = DesiredIntent::present("z1", "host1").with_values(["10.0.0.1"]);
        intent.zone = None;

        let err = intent.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(err.to_string().contains("zone"));
    }

    #[test]
    fn test_present_requires_record() {
        let mut intent = DesiredIntent::present("z1", "host1");
        intent.record = None;
        assert!(intent.validate().is_err());
    }

    #[test]
    fn test_zone_removal_requires_zone() {
        let intent = DesiredIntent {
            state: State::Absent,
            ..Default::default()
        };
        assert!(intent.validate().is_err());
        assert!(DesiredIntent::remove_zone("z1").validate().is_ok());
    }

    #[test]
    fn test_absent_record_without_zone_is_valid() {
        let intent = DesiredIntent::absent(None, "host1").with_values(["10.0.0.1"]);
        assert!(intent.validate().is_ok());
        assert!(!intent.is_zone_removal());
    }

    #[test]
    fn test_rejects_non_ipv4_values() {
        let intent = DesiredIntent::present("z1", "host1").with_values(["10.0.0.1", "host2"]);
        let err = intent.validate().unwrap_err();
        assert!(err.to_string().contains("host2"));

        let intent = DesiredIntent::present("z1", "host1").with_values(["2001:db8::1"]);
        assert!(intent.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_names() {
        assert!(DesiredIntent::present("", "host1").validate().is_err());
        assert!(DesiredIntent::present("z1", " ").validate().is_err());
    }

    #[test]
    fn test_wanted_ips_normalized() {
        let intent = DesiredIntent::present("z1", "host1")
            .with_values(["10.0.0.2", "10.0.0.1", "10.0.0.2"]);
        assert_eq!(intent.wanted_ips().to_vec(), vec!["10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn test_deserialize_single_value() {
        let intent: DesiredIntent = serde_json::from_value(serde_json::json!({
            "zone": "z1",
            "record": "host1",
            "value": "10.0.0.1",
        }))
        .unwrap();
        assert_eq!(intent.values, vec!["10.0.0.1"]);
        assert_eq!(intent.state, State::Present);
    }

    #[test]
    fn test_deserialize_value_list_and_scalars() {
        let intent: DesiredIntent = serde_yaml::from_str(
            "zone: z1\nrecord: 42\nvalue:\n  - 10.0.0.1\n  - 10.0.0.2\nstate: absent\n",
        )
        .unwrap();
        assert_eq!(intent.record.as_deref(), Some("42"));
        assert_eq!(intent.values, vec!["10.0.0.1", "10.0.0.2"]);
        assert_eq!(intent.state, State::Absent);
    }

    #[test]
    fn test_deserialize_missing_value() {
        let intent: DesiredIntent =
            serde_json::from_value(serde_json::json!({ "zone": "z1", "state": "absent" }))
                .unwrap();
        assert!(intent.values.is_empty());
        assert!(intent.is_zone_removal());
    }

    #[test]
    fn test_deserialize_rejects_unknown_state() {
        let result: std::result::Result<DesiredIntent, _> =
            serde_json::from_value(serde_json::json!({ "zone": "z1", "state": "gone" }));
        assert!(result.is_err());
    }
}

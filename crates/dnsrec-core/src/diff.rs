//! Before/after rendering for preview and diff output
//!
//! Snapshots are pruned of empty values first so that a record with no
//! addresses, or a zone with no records, does not show up as noise.

use crate::error::Result;
use crate::model::StateMap;
use serde::Serialize;
use serde_json::Value;

/// Recursively drop `null`, empty maps and empty sequences
///
/// Order and all other content are preserved. The input is left untouched.
pub fn prune(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(prune)
                .filter(|v| !is_empty(v))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), prune(v)))
                .filter(|(_, v)| !is_empty(v))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Typed counterpart of [`prune`] for state maps
pub fn prune_state(state: &StateMap) -> StateMap {
    state
        .iter()
        .map(|(zone, records)| {
            let records = records
                .iter()
                .filter(|(_, ips)| !ips.is_empty())
                .map(|(name, ips)| (name.clone(), ips.clone()))
                .collect::<std::collections::BTreeMap<_, _>>();
            (zone.clone(), records)
        })
        .filter(|(_, records)| !records.is_empty())
        .collect()
}

/// Rendered before/after snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diff {
    pub before: Option<String>,
    pub after: Option<String>,
}

impl Diff {
    /// Render observed and target state as YAML, pruned
    pub fn render(got: &StateMap, wanted: &StateMap) -> Result<Self> {
        Ok(Self {
            before: render_side(got)?,
            after: render_side(wanted)?,
        })
    }
}

fn render_side(state: &StateMap) -> Result<Option<String>> {
    let pruned = prune(&serde_json::to_value(state)?);
    if is_empty(&pruned) {
        return Ok(None);
    }
    Ok(Some(serde_yaml::to_string(&pruned)?))
}

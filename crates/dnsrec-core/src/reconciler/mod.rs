//! Reconciler
//!
//! The Reconciler is responsible for:
//! - Validating the intent before any network call
//! - Resolving the zone set and reading each zone from the zone API
//! - Planning the target state and the minimal set of API calls
//! - Applying those calls, unless running in check mode
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   observe    ┌──────────────┐
//! │ DesiredIntent│ ───────────▶ │   ZoneApi    │ (discover, get_zone)
//! └──────────────┘              └──────────────┘
//!         │                            │
//!         ▼                            ▼
//! ┌──────────────┐   plan()     ┌──────────────┐
//! │     Plan     │ ◀─────────── │ Observation  │
//! └──────────────┘              └──────────────┘
//!         │
//!         │ changed && !check_mode
//!         ▼
//! ┌──────────────┐
//! │   ZoneApi    │ (add_record, remove_record, remove_zone)
//! └──────────────┘
//! ```
//!
//! Every call is awaited before the next is issued. The first failing call
//! aborts the run; mutations already applied to earlier zones stay in place.

pub mod plan;

pub use plan::{Observation, Operation, Plan, ZoneDelta, ZoneObservation};

use crate::config::ReconcileOptions;
use crate::diff::Diff;
use crate::error::{Error, Result};
use crate::index::RecordIndex;
use crate::intent::DesiredIntent;
use crate::traits::{ZoneApi, ZoneListing};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Result of one reconciliation, as reported to the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Observed state differed from the target state
    pub changed: bool,

    /// Pruned before/after snapshots, only when something changed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<Diff>,

    /// API calls issued, or that would be issued in check mode
    pub operations: Vec<Operation>,

    /// True when no mutating call was made because of check mode
    pub check_mode: bool,
}

/// Drives one intent to convergence against a zone API
pub struct Reconciler {
    /// Zone API client
    api: Box<dyn ZoneApi>,

    /// Behaviour switches
    options: ReconcileOptions,
}

impl Reconciler {
    /// Create a new reconciler
    pub fn new(api: Box<dyn ZoneApi>, options: ReconcileOptions) -> Self {
        Self { api, options }
    }

    /// Validate, observe, plan and (unless in check mode) apply `intent`
    pub async fn reconcile(&self, intent: &DesiredIntent) -> Result<Outcome> {
        intent.validate()?;

        let observation = self.observe(intent).await?;
        let plan = plan::plan(intent, &observation);

        if !plan.changed {
            info!("Nothing to change for {}", describe(intent));
            return Ok(Outcome {
                changed: false,
                diff: None,
                operations: Vec::new(),
                check_mode: self.options.check_mode,
            });
        }

        let diff = Diff::render(&plan.got, &plan.wanted)?;

        let operations = if self.options.check_mode {
            let operations = plan.operations();
            warn!(
                "Check mode: skipping {} operation(s) for {}",
                operations.len(),
                describe(intent)
            );
            operations
        } else {
            self.apply(&plan).await?
        };

        Ok(Outcome {
            changed: true,
            diff: Some(diff),
            operations,
            check_mode: self.options.check_mode,
        })
    }

    /// Resolve the zone set for `intent` and read every zone in it
    pub async fn observe(&self, intent: &DesiredIntent) -> Result<Observation> {
        let zones = match self.api.discover().await? {
            ZoneListing::Zones(mut known) => {
                let mut seen = HashSet::new();
                known.retain(|zone| seen.insert(zone.clone()));
                debug!(
                    "{} lists {} zone(s): {:?}",
                    self.api.api_name(),
                    known.len(),
                    known
                );

                match intent.zone.as_deref() {
                    Some(zone) if !known.iter().any(|z| z == zone) => {
                        debug!("Zone {} is not known to the server, treating it as new", zone);
                        return Ok(Observation {
                            zones: vec![ZoneObservation::new_zone(zone)],
                        });
                    }
                    Some(zone) => vec![zone.to_string()],
                    None => known,
                }
            }
            ZoneListing::Records(_) => match intent.zone.as_deref() {
                Some(zone) => {
                    debug!(
                        "{} answered the zone listing with a record mapping, reading zone {} directly",
                        self.api.api_name(),
                        zone
                    );
                    vec![zone.to_string()]
                }
                None => {
                    return Err(Error::unknown(
                        "Server answered the zone listing with a record mapping; argument 'zone' is required",
                    ));
                }
            },
        };

        let mut observed = Vec::with_capacity(zones.len());
        for zone in zones {
            let native = self.api.get_zone(&zone).await?;
            debug!("Zone {} holds {} address(es)", zone, native.len());
            observed.push(ZoneObservation::existing(zone, RecordIndex::build(&native)));
        }

        Ok(Observation { zones: observed })
    }

    /// Issue the API calls of `plan`, in order, stopping at the first error
    ///
    /// Returns the operations that were applied. Does nothing for an
    /// unchanged plan.
    pub async fn apply(&self, plan: &Plan) -> Result<Vec<Operation>> {
        let operations = plan.operations();

        for operation in &operations {
            match operation {
                Operation::AddRecord { zone, ip, record } => {
                    info!("Adding {} -> {} in zone {}", record, ip, zone);
                    self.api.add_record(zone, ip, record).await?;
                }
                Operation::RemoveRecord { zone, ip, record } => {
                    info!("Removing {} -> {} from zone {}", record, ip, zone);
                    self.api.remove_record(zone, ip, record).await?;
                }
                Operation::RemoveZone { zone } => {
                    info!("Removing zone {}", zone);
                    self.api.remove_zone(zone).await?;
                }
            }
        }

        Ok(operations)
    }
}

fn describe(intent: &DesiredIntent) -> String {
    format!(
        "zone={} record={} state={}",
        intent.zone.as_deref().unwrap_or("*"),
        intent.record.as_deref().unwrap_or("*"),
        intent.state
    )
}

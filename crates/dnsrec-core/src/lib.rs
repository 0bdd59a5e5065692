// # dnsrec-core
//
// Core library for reconciling A records served by a DNS server's HTTP zone
// API against a declared intent.
//
// ## Architecture Overview
//
// - **ZoneApi**: Trait for reading and mutating zones through the HTTP API
// - **RecordIndex**: Reverses the server's `IP -> [names]` view into `name -> [IPs]`
// - **Reconciler**: Observes, plans and applies the minimal set of API calls
// - **Diff**: Pruned before/after rendering for check and diff output
//
// ## Design Principles
//
// 1. **Idempotency**: A second run with the same intent changes nothing
// 2. **Determinism**: IP sets are sorted and deduplicated; calls are issued in sorted order
// 3. **Fail Fast**: Argument errors abort before any network call, API errors abort the run
// 4. **Library-First**: The binary is a thin layer over this crate

pub mod config;
pub mod diff;
pub mod error;
pub mod index;
pub mod intent;
pub mod model;
pub mod reconciler;
pub mod traits;

// Re-export core types for convenience
pub use config::{ApiConfig, ReconcileOptions, TaskConfig};
pub use diff::Diff;
pub use error::{Error, Result};
pub use index::RecordIndex;
pub use intent::DesiredIntent;
pub use model::{IpSet, NativeMapping, RecordName, State, StateMap, Zone, ZoneRecords};
pub use reconciler::{Operation, Outcome, Plan, Reconciler, ZoneDelta};
pub use traits::{ZoneApi, ZoneListing};

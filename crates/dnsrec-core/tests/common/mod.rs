//! Test doubles and common utilities for reconciliation contract tests
//!
//! [`MockZoneApi`] behaves like the zone HTTP API: it keeps zones as native
//! `IP -> [names]` mappings, creates zones on first add, and records every
//! call so tests can assert on the exact sequence issued.

#![allow(dead_code)]

use dnsrec_core::error::{Error, Result};
use dnsrec_core::model::NativeMapping;
use dnsrec_core::traits::ZoneApi;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One call received by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListZones,
    GetZone(String),
    AddRecord(String, String, String),
    RemoveRecord(String, String, String),
    RemoveIp(String, String),
    RemoveZone(String),
}

impl Call {
    /// True for calls that change server state
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Call::ListZones | Call::GetZone(_))
    }
}

/// In-memory zone API that tracks calls
#[derive(Clone, Default)]
pub struct MockZoneApi {
    /// Server-side zones
    zones: Arc<Mutex<BTreeMap<String, NativeMapping>>>,
    /// Every call, in order
    calls: Arc<Mutex<Vec<Call>>>,
    /// Successful mutations before mutations start failing (None = never)
    fail_after_mutations: Arc<Mutex<Option<usize>>>,
    /// Mutations served so far
    mutation_count: Arc<AtomicUsize>,
}

impl MockZoneApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a zone from `(ip, name)` pairs
    pub fn with_zone(self, zone: &str, entries: &[(&str, &str)]) -> Self {
        let mut native = NativeMapping::new();
        for (ip, name) in entries {
            let names: &mut Vec<String> = native.entry(ip.to_string()).or_default();
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        self.zones.lock().unwrap().insert(zone.to_string(), native);
        self
    }

    /// Builder: make every mutation after the first `n` fail with a transport error
    pub fn failing_after_mutations(self, n: usize) -> Self {
        *self.fail_after_mutations.lock().unwrap() = Some(n);
        self
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Mutating calls received so far
    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    /// Forget recorded calls, keep zone contents
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Sorted addresses currently assigned to `name` in `zone`
    pub fn ips_of(&self, zone: &str, name: &str) -> Vec<String> {
        let zones = self.zones.lock().unwrap();
        let mut ips: Vec<String> = zones
            .get(zone)
            .map(|native| {
                native
                    .iter()
                    .filter(|(_, names)| names.iter().any(|n| n == name))
                    .map(|(ip, _)| ip.clone())
                    .collect()
            })
            .unwrap_or_default();
        ips.sort();
        ips
    }

    /// True if the server knows `zone`
    pub fn has_zone(&self, zone: &str) -> bool {
        self.zones.lock().unwrap().contains_key(zone)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_mutation_allowed(&self) -> Result<()> {
        let served = self.mutation_count.fetch_add(1, Ordering::SeqCst);
        match *self.fail_after_mutations.lock().unwrap() {
            Some(limit) if served >= limit => {
                Err(Error::transport("connection reset by peer"))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ZoneApi for MockZoneApi {
    async fn list_zones(&self) -> Result<Vec<String>> {
        self.record(Call::ListZones);
        Ok(self.zones.lock().unwrap().keys().cloned().collect())
    }

    async fn get_zone(&self, zone: &str) -> Result<NativeMapping> {
        self.record(Call::GetZone(zone.to_string()));
        self.zones
            .lock()
            .unwrap()
            .get(zone)
            .cloned()
            .ok_or_else(|| Error::http_status(404, format!("zone {} not found", zone)))
    }

    async fn add_record(&self, zone: &str, ip: &str, name: &str) -> Result<()> {
        self.record(Call::AddRecord(
            zone.to_string(),
            ip.to_string(),
            name.to_string(),
        ));
        self.check_mutation_allowed()?;

        let mut zones = self.zones.lock().unwrap();
        let names = zones
            .entry(zone.to_string())
            .or_default()
            .entry(ip.to_string())
            .or_default();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        Ok(())
    }

    async fn remove_record(&self, zone: &str, ip: &str, name: &str) -> Result<()> {
        self.record(Call::RemoveRecord(
            zone.to_string(),
            ip.to_string(),
            name.to_string(),
        ));
        self.check_mutation_allowed()?;

        let mut zones = self.zones.lock().unwrap();
        let native = zones
            .get_mut(zone)
            .ok_or_else(|| Error::http_status(404, format!("zone {} not found", zone)))?;
        if let Some(names) = native.get_mut(ip) {
            names.retain(|n| n != name);
            if names.is_empty() {
                native.remove(ip);
            }
        }
        Ok(())
    }

    async fn remove_ip(&self, zone: &str, ip: &str) -> Result<()> {
        self.record(Call::RemoveIp(zone.to_string(), ip.to_string()));
        self.check_mutation_allowed()?;

        if let Some(native) = self.zones.lock().unwrap().get_mut(zone) {
            native.remove(ip);
        }
        Ok(())
    }

    async fn remove_zone(&self, zone: &str) -> Result<()> {
        self.record(Call::RemoveZone(zone.to_string()));
        self.check_mutation_allowed()?;

        self.zones.lock().unwrap().remove(zone);
        Ok(())
    }

    fn api_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to build an add call
pub fn add(zone: &str, ip: &str, name: &str) -> Call {
    Call::AddRecord(zone.to_string(), ip.to_string(), name.to_string())
}

/// Helper to build a remove call
pub fn remove(zone: &str, ip: &str, name: &str) -> Call {
    Call::RemoveRecord(zone.to_string(), ip.to_string(), name.to_string())
}

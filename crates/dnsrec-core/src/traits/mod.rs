//! Core traits for dnsrec
//!
//! - [`ZoneApi`]: Read and mutate zones through a DNS server's HTTP API

pub mod zone_api;

pub use zone_api::{ZoneApi, ZoneListing};

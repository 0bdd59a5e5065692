// # Zone API Trait
//
// Defines the interface to a DNS server's HTTP zone management API.
//
// ## Implementations
//
// - HTTP (reqwest): `dnsrec-api-http` crate
// - Tests: in-memory doubles under `tests/common`
//
// ## Usage
//
// ```rust,ignore
// use dnsrec_core::ZoneApi;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let api = /* ZoneApi implementation */;
//
//     for zone in api.list_zones().await? {
//         let native = api.get_zone(&zone).await?;
//         println!("{}: {} address(es)", zone, native.len());
//     }
//
//     api.add_record("lan", "10.0.0.1", "host1").await?;
//
//     Ok(())
// }
// ```

use crate::model::{NativeMapping, Zone};
use async_trait::async_trait;

/// Result of a discovery fetch against the zone API
///
/// `GET /zones` normally answers with a list of zone names, but legacy
/// servers answer with a single zone's native mapping instead. The shape is
/// decided once at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneListing {
    /// A list of zone identifiers
    Zones(Vec<Zone>),
    /// A single zone's `IP -> [RecordName]` mapping
    Records(NativeMapping),
}

impl ZoneListing {
    /// Zone identifiers, or an error if the server sent records
    pub fn into_zones(self) -> crate::Result<Vec<Zone>> {
        match self {
            ZoneListing::Zones(zones) => Ok(zones),
            ZoneListing::Records(_) => Err(crate::Error::unknown(
                "expected a list of zones, got a record mapping",
            )),
        }
    }

    /// Native mapping, or an error if the server sent a zone list
    pub fn into_records(self) -> crate::Result<NativeMapping> {
        match self {
            ZoneListing::Records(records) => Ok(records),
            ZoneListing::Zones(_) => Err(crate::Error::unknown(
                "expected a record mapping, got a list of zones",
            )),
        }
    }
}

/// Trait for zone API clients
///
/// Each method performs exactly one request. Implementations translate
/// failures into [`crate::Error::Transport`], [`crate::Error::HttpStatus`] or
/// [`crate::Error::Unknown`] and never retry; the reconciler aborts on the
/// first error.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait ZoneApi: Send + Sync {
    /// List the zones known to the server (`GET /zones`)
    async fn list_zones(&self) -> crate::Result<Vec<Zone>>;

    /// `GET /zones`, keeping the shape of the answer
    ///
    /// Legacy servers answer with a single zone's mapping instead of a zone
    /// list. The default wraps [`ZoneApi::list_zones`] for servers that always
    /// list.
    async fn discover(&self) -> crate::Result<ZoneListing> {
        Ok(ZoneListing::Zones(self.list_zones().await?))
    }

    /// Fetch a zone's native `IP -> [RecordName]` mapping (`GET /zones/{zone}`)
    async fn get_zone(&self, zone: &str) -> crate::Result<NativeMapping>;

    /// Assign `ip` to `name` in `zone` (`POST /zones/{zone}/{ip}/{name}`)
    ///
    /// Adding to a zone the server does not know yet creates that zone.
    async fn add_record(&self, zone: &str, ip: &str, name: &str) -> crate::Result<()>;

    /// Drop the `ip` assignment from `name` (`DELETE /zones/{zone}/{ip}/{name}`)
    async fn remove_record(&self, zone: &str, ip: &str, name: &str) -> crate::Result<()>;

    /// Drop every name assigned to `ip` (`DELETE /zones/{zone}/{ip}`)
    async fn remove_ip(&self, zone: &str, ip: &str) -> crate::Result<()>;

    /// Delete a whole zone (`DELETE /zones/{zone}`)
    async fn remove_zone(&self, zone: &str) -> crate::Result<()>;

    /// Short name of the implementation, for logging
    fn api_name(&self) -> &'static str;
}

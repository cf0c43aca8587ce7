// # DNS Client Trait
//
// Defines the interface to the provider's record and snapshot API.
//
// ## Implementations
//
// - LiveDNS: `ddns-provider-livedns` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsClient, DesiredRecord};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let client = /* DnsClient implementation */;
//
//     let records = client.list_records("example.com").await?;
//     let snapshot = client.create_snapshot("example.com", "backup").await?;
//     client
//         .write_record(
//             "example.com",
//             &DesiredRecord::for_ip("@", "203.0.113.5".parse()?, 3600),
//         )
//         .await?;
//     client.delete_snapshot("example.com", &snapshot).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

use crate::records::{DesiredRecord, RemoteRecord, Snapshot};

/// Trait for DNS provider clients
///
/// A thin typed wrapper over the provider's REST API. Every method maps to
/// exactly one HTTP call.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to the provider endpoint only
/// - ✅ Parse provider-specific responses
/// - ✅ Return success or failure (the engine decides what failure means)
///
/// ## Forbidden Capabilities
/// - ❌ Implement retry logic or backoff
/// - ❌ Decide whether an update is needed (owned by `ReconciliationEngine`)
/// - ❌ Snapshot or delete snapshots on its own initiative
/// - ❌ Cache zone state beyond a single request
#[async_trait]
pub trait DnsClient: Send + Sync {
    /// List every record of the zone
    ///
    /// Returns all types; filtering to the managed names and type is the
    /// caller's job.
    ///
    /// # Errors
    ///
    /// `Error::List` (or a more specific transport/auth error) if the zone
    /// cannot be read.
    async fn list_records(&self, domain: &str) -> Result<Vec<RemoteRecord>, crate::Error>;

    /// Create a named backup of the current zone state
    ///
    /// # Errors
    ///
    /// `Error::Snapshot` on any non-success response.
    async fn create_snapshot(&self, domain: &str, name: &str) -> Result<Snapshot, crate::Error>;

    /// Delete a snapshot
    ///
    /// Callers treat failure as best-effort and only log it.
    async fn delete_snapshot(&self, domain: &str, snapshot: &Snapshot) -> Result<(), crate::Error>;

    /// Upsert one record
    ///
    /// Replace semantics: `record.values` fully replaces the remote value
    /// set, and the TTL is written in the same call.
    ///
    /// # Errors
    ///
    /// `Error::Update` on any non-success response, carrying the provider's
    /// error body.
    async fn write_record(&self, domain: &str, record: &DesiredRecord) -> Result<(), crate::Error>;

    /// Ask the provider to update the reverse-DNS (PTR) entry of `ip`
    ///
    /// Propagation happens asynchronously on the provider side; callers
    /// treat failure as best-effort.
    async fn trigger_ptr_update(&self, domain: &str, ip: IpAddr) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

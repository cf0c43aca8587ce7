//! Record types exchanged between the engine and a [`DnsClient`](crate::DnsClient)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Address record type managed by the updater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Record type matching an address family
    pub fn for_ip(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::Aaaa,
        }
    }

    /// Wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record as currently published by the provider
///
/// `record_type` is kept as the raw string because the zone listing contains
/// every record type (MX, TXT, CNAME, ...), not only the managed ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    #[serde(rename = "rrset_name", alias = "name")]
    pub name: String,

    #[serde(rename = "rrset_type", alias = "type")]
    pub record_type: String,

    #[serde(rename = "rrset_ttl", alias = "ttl", default)]
    pub ttl: u32,

    #[serde(rename = "rrset_values", alias = "values", default)]
    pub values: Vec<String>,
}

impl RemoteRecord {
    /// Whether this record is the managed record `name`/`record_type`
    pub fn is(&self, name: &str, record_type: RecordType) -> bool {
        self.name == name && self.record_type.eq_ignore_ascii_case(record_type.as_str())
    }
}

/// The state a managed record should have after the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesiredRecord {
    pub name: String,
    pub record_type: RecordType,
    pub ttl: u32,
    /// Always the single resolved address
    pub values: Vec<String>,
}

impl DesiredRecord {
    /// Desired record pointing `name` at `ip`
    pub fn for_ip(name: impl Into<String>, ip: IpAddr, ttl: u32) -> Self {
        Self {
            name: name.into(),
            record_type: RecordType::for_ip(&ip),
            ttl,
            values: vec![ip.to_string()],
        }
    }
}

/// Provider-side backup of the zone, identified by an opaque id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
}

impl Snapshot {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// One entry of the diff: a managed record whose remote state differs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    /// Name of the record
    pub name: String,
    /// Current remote state, `None` if the record does not exist yet
    pub current: Option<RemoteRecord>,
    /// State the record will be written to
    pub desired: DesiredRecord,
}

impl RecordChange {
    /// Current values joined for display (`-` when absent)
    pub fn current_values(&self) -> String {
        match self.current {
            Some(ref record) if !record.values.is_empty() => record.values.join(","),
            _ => "-".to_string(),
        }
    }
}

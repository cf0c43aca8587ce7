//! Test doubles and common utilities for engine contract tests
//!
//! The doubles record every call so tests can assert on exactly which
//! provider operations a run performed, and in which order.

#![allow(dead_code)]

use ddns_core::config::{ApiConfig, AuthScheme, DdnsConfig, DnsConfig, IpConfig};
use ddns_core::error::{Error, Result};
use ddns_core::records::{DesiredRecord, RemoteRecord, Snapshot};
use ddns_core::traits::{DnsClient, IpResolver};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A resolver that always returns the same IP
pub struct StaticResolver {
    ip: IpAddr,
    resolve_call_count: Arc<AtomicUsize>,
}

impl StaticResolver {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times resolve() was called
    pub fn resolve_call_count(&self) -> usize {
        self.resolve_call_count.load(Ordering::SeqCst)
    }

    /// Create a new StaticResolver that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            ip: other.ip,
            resolve_call_count: Arc::clone(&other.resolve_call_count),
        }
    }
}

#[async_trait::async_trait]
impl IpResolver for StaticResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        self.resolve_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.ip)
    }

    fn resolver_name(&self) -> &'static str {
        "static"
    }
}

/// A resolver that always fails
pub struct FailingResolver;

#[async_trait::async_trait]
impl IpResolver for FailingResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        Err(Error::resolution("both resolvers timed out"))
    }

    fn resolver_name(&self) -> &'static str {
        "failing"
    }
}

/// A provider call, as recorded by [`MockDnsClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    CreateSnapshot,
    DeleteSnapshot(String),
    Write(String),
    Ptr(IpAddr),
}

/// Failures a [`MockDnsClient`] should inject
#[derive(Debug, Clone, Default)]
pub struct Failures {
    pub list: bool,
    pub create_snapshot: bool,
    pub delete_snapshot: bool,
    pub ptr: bool,
    /// Record names whose write fails
    pub write: Vec<String>,
}

/// A mock DnsClient backed by an in-memory zone
///
/// Successful writes are applied to the zone, so a second run sees the
/// result of the first one.
pub struct MockDnsClient {
    zone: Arc<Mutex<Vec<RemoteRecord>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    failures: Failures,
}

impl MockDnsClient {
    pub fn new(zone: Vec<RemoteRecord>) -> Self {
        Self::with_failures(zone, Failures::default())
    }

    pub fn with_failures(zone: Vec<RemoteRecord>, failures: Failures) -> Self {
        Self {
            zone: Arc::new(Mutex::new(zone)),
            calls: Arc::new(Mutex::new(Vec::new())),
            failures,
        }
    }

    /// Create a new MockDnsClient that shares zone and call log with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            zone: Arc::clone(&other.zone),
            calls: Arc::clone(&other.calls),
            failures: other.failures.clone(),
        }
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls matching `pred`
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn snapshot_count(&self) -> usize {
        self.count(|c| matches!(c, Call::CreateSnapshot))
    }

    pub fn delete_count(&self) -> usize {
        self.count(|c| matches!(c, Call::DeleteSnapshot(_)))
    }

    pub fn write_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Write(_)))
    }

    pub fn ptr_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Ptr(_)))
    }

    /// Names passed to write_record(), in order
    pub fn written(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Write(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    /// Current zone content
    pub fn zone(&self) -> Vec<RemoteRecord> {
        self.zone.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl DnsClient for MockDnsClient {
    async fn list_records(&self, _domain: &str) -> Result<Vec<RemoteRecord>> {
        self.record(Call::List);
        if self.failures.list {
            return Err(Error::list("HTTP 500 - internal error"));
        }
        Ok(self.zone())
    }

    async fn create_snapshot(&self, _domain: &str, _name: &str) -> Result<Snapshot> {
        self.record(Call::CreateSnapshot);
        if self.failures.create_snapshot {
            return Err(Error::snapshot("HTTP 403 - forbidden"));
        }
        Ok(Snapshot::new("snap-1"))
    }

    async fn delete_snapshot(&self, _domain: &str, snapshot: &Snapshot) -> Result<()> {
        self.record(Call::DeleteSnapshot(snapshot.id.clone()));
        if self.failures.delete_snapshot {
            return Err(Error::http("connection reset"));
        }
        Ok(())
    }

    async fn write_record(&self, _domain: &str, record: &DesiredRecord) -> Result<()> {
        self.record(Call::Write(record.name.clone()));
        if self.failures.write.contains(&record.name) {
            return Err(Error::update(format!(
                "HTTP 400 - {{\"cause\":\"Bad Request\",\"name\":\"{}\"}}",
                record.name
            )));
        }

        let mut zone = self.zone.lock().unwrap();
        zone.retain(|r| !r.is(&record.name, record.record_type));
        zone.push(RemoteRecord {
            name: record.name.clone(),
            record_type: record.record_type.to_string(),
            ttl: record.ttl,
            values: record.values.clone(),
        });
        Ok(())
    }

    async fn trigger_ptr_update(&self, _domain: &str, ip: IpAddr) -> Result<()> {
        self.record(Call::Ptr(ip));
        if self.failures.ptr {
            return Err(Error::provider("mock", "PTR endpoint unavailable"));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// An A record in the mock zone
pub fn a_record(name: &str, ip: &str, ttl: u32) -> RemoteRecord {
    RemoteRecord {
        name: name.to_string(),
        record_type: "A".to_string(),
        ttl,
        values: vec![ip.to_string()],
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(records: &[&str]) -> DdnsConfig {
    DdnsConfig {
        api: ApiConfig {
            url: "https://api.example.test/v5/livedns".to_string(),
            key: "test-key".to_string(),
            auth: AuthScheme::Apikey,
        },
        dns: DnsConfig {
            domain: "example.com".to_string(),
            records: records.iter().map(|r| r.to_string()).collect(),
            ttl: 3600,
            update_ptr: false,
        },
        ip: IpConfig {
            resolver_url: "https://resolver.example.test".to_string(),
            resolver_url_alt: None,
            timeout_secs: 5,
        },
        dry_run: false,
    }
}

/// Drain every event currently queued
pub fn drain_events(
    rx: &mut tokio::sync::mpsc::Receiver<ddns_core::EngineEvent>,
) -> Vec<ddns_core::EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

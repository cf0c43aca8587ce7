//! Core reconciliation engine
//!
//! The ReconciliationEngine is responsible for:
//! - Resolving the current public IP via IpResolver
//! - Reading the zone via DnsClient and computing the diff
//! - Snapshotting, writing the changed records, and cleaning up
//! - Reducing all of it to a single [`Outcome`]
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │ IpResolver  │─── IpAddr ──────────┐
//! └─────────────┘                     │
//!                                     ▼
//!                        ┌──────────────────────┐
//!                        │ ReconciliationEngine │──── Outcome
//!                        └──────────────────────┘
//!                                     │
//!                 ┌───────────────────┴───────────────────┐
//!                 │                                       │
//!                 ▼                                       ▼
//!         ┌──────────────┐                        ┌─────────────┐
//!         │  DnsClient   │                        │   Events    │
//!         │ list/snapshot│                        │  (notify)   │
//!         │ write/delete │                        └─────────────┘
//!         └──────────────┘
//! ```
//!
//! ## Run Flow
//!
//! 1. Resolve the IP (failure → `Error("resolution failed")`)
//! 2. List the zone (failure → `Error("listing records failed")`)
//! 3. Diff managed records against the resolved IP and TTL
//! 4. Empty diff → `NoChange`; dry-run → `Updated(diff)` without any write
//! 5. Create a snapshot (failure → `Error("snapshot failed")`, no write)
//! 6. Write each changed record in configured order; the first failure
//!    stops the run and keeps the snapshot
//! 7. Delete the snapshot (best-effort) → `Updated(diff)`

mod diff;

pub use diff::{compute_diff, find_record, needs_update};

use crate::config::DdnsConfig;
use crate::error::Result;
use crate::outcome::{Outcome, REASON_LIST, REASON_RESOLUTION, REASON_SNAPSHOT};
use crate::records::{RecordChange, Snapshot};
use crate::traits::{DnsClient, IpResolver};
use std::net::IpAddr;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Name of the zone apex record, the one reverse DNS follows
pub const APEX_RECORD: &str = "@";

/// Events emitted once per run (IP, listing, snapshot, cleanup, PTR)
const EVENT_CHANNEL_BASE_CAPACITY: usize = 16;

/// Upper bound of the events emitted for one managed record
/// (changed/unchanged, then written)
const EVENTS_PER_RECORD: usize = 2;

/// Events emitted by the ReconciliationEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Public IP resolved
    IpResolved { ip: IpAddr },

    /// Zone listing received
    RecordsListed { count: usize },

    /// Managed record differs from the desired state
    RecordChanged { change: RecordChange },

    /// Managed record already matches
    RecordUnchanged { name: String },

    /// Safety snapshot created
    SnapshotCreated { snapshot: Snapshot },

    /// Record written
    RecordWritten { name: String },

    /// Reverse DNS update requested
    PtrUpdateRequested { ip: IpAddr },

    /// Reverse DNS update request failed (ignored)
    PtrUpdateFailed { error: String },

    /// Safety snapshot deleted after a full update
    SnapshotDeleted { snapshot: Snapshot },

    /// Safety snapshot could not be deleted (ignored)
    SnapshotCleanupFailed { snapshot: Snapshot, error: String },
}

/// Core reconciliation engine
///
/// One engine performs one deterministic, sequential pass per call to
/// [`ReconciliationEngine::run()`]. Nothing runs concurrently and nothing is
/// retried: every failure becomes an [`Outcome::Error`].
///
/// ## Lifecycle
///
/// 1. Create with [`ReconciliationEngine::new()`]
/// 2. Call [`ReconciliationEngine::run()`]
/// 3. Drain the event receiver for reporting
pub struct ReconciliationEngine {
    /// Resolver for the current public IP
    resolver: Box<dyn IpResolver>,

    /// Provider client
    client: Box<dyn DnsClient>,

    /// Managed zone
    domain: String,

    /// Managed record names, in update order
    records: Vec<String>,

    /// TTL written to every managed record
    ttl: u32,

    /// Trigger reverse DNS when `@` changes
    update_ptr: bool,

    /// Report changes without performing them
    dry_run: bool,

    /// Event sender for reporting
    event_tx: mpsc::Sender<EngineEvent>,
}

impl ReconciliationEngine {
    /// Create a new engine
    ///
    /// # Parameters
    ///
    /// - `resolver`: IP resolver implementation
    /// - `client`: DNS client implementation
    /// - `config`: Updater configuration (validated here)
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        resolver: Box<dyn IpResolver>,
        client: Box<dyn DnsClient>,
        config: &DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        // Callers may only drain the receiver after `run()` returns
        let (tx, rx) = mpsc::channel(event_channel_capacity(config.dns.records.len()));

        let engine = Self {
            resolver,
            client,
            domain: config.dns.domain.clone(),
            records: config.dns.records.clone(),
            ttl: config.dns.ttl,
            update_ptr: config.dns.update_ptr,
            dry_run: config.dry_run,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run one reconciliation pass
    ///
    /// Never returns early with an `Err`: every failure is folded into the
    /// returned [`Outcome`].
    pub async fn run(&self) -> Outcome {
        let ip = match self.resolver.resolve().await {
            Ok(ip) => ip,
            Err(e) => {
                error!("IP resolver {} failed: {}", self.resolver.resolver_name(), e);
                return Outcome::error(REASON_RESOLUTION, &e, None);
            }
        };
        info!("Resolved IP: {}", ip);
        self.emit_event(EngineEvent::IpResolved { ip });

        let changes = match self.plan(ip).await {
            Ok(changes) => changes,
            Err(e) => {
                error!(
                    "{}: failed to list records of {}: {}",
                    self.client.provider_name(),
                    self.domain,
                    e
                );
                return Outcome::error(REASON_LIST, &e, None);
            }
        };

        if changes.is_empty() {
            info!("All {} record(s) already point at {}", self.records.len(), ip);
            return Outcome::NoChange;
        }

        let names: Vec<String> = changes.iter().map(|c| c.name.clone()).collect();

        if self.dry_run {
            info!(
                "[DRY-RUN] Would update {} record(s): {}",
                names.len(),
                names.join(", ")
            );
            return Outcome::Updated(names);
        }

        self.apply(ip, &changes).await
    }

    /// Read the zone and compute the changes needed for the managed records
    ///
    /// Performs the listing call only; nothing is written.
    pub async fn plan(&self, ip: IpAddr) -> Result<Vec<RecordChange>> {
        let remote = self.client.list_records(&self.domain).await?;
        debug!("Zone {} has {} record(s)", self.domain, remote.len());
        self.emit_event(EngineEvent::RecordsListed {
            count: remote.len(),
        });

        let changes = compute_diff(&self.records, &remote, ip, self.ttl);

        for name in &self.records {
            match changes.iter().find(|c| &c.name == name) {
                Some(change) => {
                    info!(
                        "Record {}/{} differs: {} -> {}",
                        change.name,
                        change.desired.record_type,
                        change.current_values(),
                        ip
                    );
                    self.emit_event(EngineEvent::RecordChanged {
                        change: change.clone(),
                    });
                }
                None => {
                    debug!("Record {} is up to date", name);
                    self.emit_event(EngineEvent::RecordUnchanged { name: name.clone() });
                }
            }
        }

        Ok(changes)
    }

    /// Snapshot, write every change, then drop the snapshot
    ///
    /// The snapshot is only deleted when every write succeeded. On the first
    /// failed write the remaining records are left alone, earlier writes are
    /// kept, and the snapshot id is returned for manual recovery.
    async fn apply(&self, ip: IpAddr, changes: &[RecordChange]) -> Outcome {
        let snapshot = match self
            .client
            .create_snapshot(&self.domain, &snapshot_name())
            .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(
                    "{}: could not create snapshot of {}: {}",
                    self.client.provider_name(),
                    self.domain,
                    e
                );
                return Outcome::error(REASON_SNAPSHOT, &e, None);
            }
        };
        info!("Backup snapshot created, id: {}", snapshot);
        self.emit_event(EngineEvent::SnapshotCreated {
            snapshot: snapshot.clone(),
        });

        for change in changes {
            if let Err(e) = self.client.write_record(&self.domain, &change.desired).await {
                error!(
                    "{}: failed to update {}/{}: {}. Backup snapshot id: {}",
                    self.client.provider_name(),
                    change.name,
                    change.desired.record_type,
                    e,
                    snapshot
                );
                return Outcome::error(
                    Outcome::update_failed_reason(&change.name),
                    &e,
                    Some(snapshot),
                );
            }

            info!(
                "Updated record {}/{} from {} to {}",
                change.name,
                change.desired.record_type,
                change.current_values(),
                ip
            );
            self.emit_event(EngineEvent::RecordWritten {
                name: change.name.clone(),
            });

            if self.update_ptr && change.name == APEX_RECORD {
                self.request_ptr_update(ip).await;
            }
        }

        match self.client.delete_snapshot(&self.domain, &snapshot).await {
            Ok(()) => {
                info!("Backup snapshot {} deleted", snapshot);
                self.emit_event(EngineEvent::SnapshotDeleted { snapshot });
            }
            Err(e) => {
                warn!("Could not delete backup snapshot {}: {}", snapshot, e);
                self.emit_event(EngineEvent::SnapshotCleanupFailed {
                    snapshot,
                    error: e.to_string(),
                });
            }
        }

        Outcome::Updated(changes.iter().map(|c| c.name.clone()).collect())
    }

    /// Best-effort reverse DNS trigger
    async fn request_ptr_update(&self, ip: IpAddr) {
        match self.client.trigger_ptr_update(&self.domain, ip).await {
            Ok(()) => {
                info!("Reverse DNS update requested for {}", ip);
                self.emit_event(EngineEvent::PtrUpdateRequested { ip });
            }
            Err(e) => {
                warn!("Reverse DNS update for {} failed: {}", ip, e);
                self.emit_event(EngineEvent::PtrUpdateFailed {
                    error: e.to_string(),
                });
            }
        }
    }

    /// Emit an engine event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    fn emit_event(&self, event: EngineEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full or closed, dropping event");
        }
    }
}

/// Event channel capacity for `records` managed records
fn event_channel_capacity(records: usize) -> usize {
    EVENT_CHANNEL_BASE_CAPACITY + EVENTS_PER_RECORD * records
}

/// Name given to the safety snapshot
fn snapshot_name() -> String {
    format!(
        "ddns-update snapshot {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S")
    )
}

// # ddns-core
//
// Core library for the one-shot DDNS updater.
//
// ## Architecture Overview
//
// This library provides the reconciliation logic for dynamic DNS updates:
// - **IpResolver**: Trait for determining the current public IP
// - **DnsClient**: Trait for the provider's record/snapshot API
// - **ReconciliationEngine**: Resolves, diffs, snapshots, writes, and
//   reduces the run to an `Outcome`
// - **IpFile**: Optional local copy of the last resolved IP
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from HTTP implementations
// 2. **Single Pass**: One invocation, one sequential run, no hidden retries
// 3. **Snapshot Before Write**: No record is written without a provider-side
//    backup; the backup is kept whenever the run does not fully succeed
// 4. **Library-First**: The engine is testable against in-process fakes

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod outcome;
pub mod records;
pub mod state;

// Re-export core types for convenience
pub use traits::{IpResolver, DnsClient};
pub use engine::{ReconciliationEngine, EngineEvent};
pub use config::{DdnsConfig, ApiConfig, DnsConfig, IpConfig, AuthScheme};
pub use error::{Error, Result};
pub use outcome::Outcome;
pub use records::{RecordType, RemoteRecord, DesiredRecord, Snapshot, RecordChange};
pub use state::IpFile;

//! Core traits for the DDNS updater
//!
//! This module defines the two seams the engine is built on.
//!
//! - [`IpResolver`]: Determine the current public IP
//! - [`DnsClient`]: Read and write the provider's records and snapshots

pub mod ip_resolver;
pub mod dns_client;

pub use ip_resolver::IpResolver;
pub use dns_client::DnsClient;

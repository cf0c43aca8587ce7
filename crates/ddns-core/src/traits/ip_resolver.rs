// # IP Resolver Trait
//
// Defines the interface for determining the caller's current public IP.
//
// ## Implementations
//
// - HTTP-based: `ddns-ip-http` crate (primary URL with alternate fallback)
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* IpResolver implementation */;
//
//     let ip = resolver.resolve().await?;
//     println!("Public IP: {}", ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for IP resolver implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Trust Level: Semi-Trusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS requests to the configured resolver endpoints
/// - ✅ Fall back from the primary to the alternate endpoint once
///
/// ## Forbidden Capabilities
/// - ❌ Perform DNS updates (use `DnsClient`)
/// - ❌ Retry beyond the single primary → alternate fallback
/// - ❌ Cache a previously resolved address between runs
/// - ❌ Make decisions about when to update DNS
///
/// Any retry policy beyond that (rerunning on a schedule) belongs to
/// whatever invokes the updater.
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Resolve the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: A validated address
    /// - `Err(Error::Resolution)`: If every configured endpoint failed, or
    ///   the response did not contain a valid address
    async fn resolve(&self) -> Result<IpAddr, crate::Error>;

    /// Get the resolver name (for logging/debugging)
    fn resolver_name(&self) -> &'static str;
}

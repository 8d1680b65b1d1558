// # DNS Resolver Trait
//
// Defines the interface for reading the currently-published IP of a
// hostname via live DNS resolution.
//
// The resolver is the agent's only "memory" of what it last published:
// the authoritative DNS record itself. The loop re-resolves every
// subdomain every cycle instead of keeping a local cache, which keeps it
// self-healing when records are changed externally.

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for DNS resolution implementations
///
/// Implementations must be thread-safe and usable across async tasks.
/// The configured resolver endpoint and address-family preference are
/// construction-time concerns of the implementation.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Resolve the published address for a fully-qualified hostname
    ///
    /// # Parameters
    ///
    /// - `hostname`: The name to resolve (e.g., "home.example.com")
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The first published address in the configured family
    /// - `Err(Error)`: On NXDOMAIN, timeout, or a malformed response
    async fn resolve(&self, hostname: &str) -> Result<IpAddr, crate::Error>;
}

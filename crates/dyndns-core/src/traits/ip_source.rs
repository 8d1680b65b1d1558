// # IP Source Trait
//
// Defines the interface for discovering the host's current public IP.
//
// ## Implementations
//
// - HTTP-based (external services): `dyndns-ip-http` crate
// - Future: router/UPnP queries, interface inspection
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::IpSource;
//
// let source = /* IpSource implementation */;
// let current_ip = source.current().await?;
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for IP discovery implementations
///
/// The domain loop calls [`current`](IpSource::current) once per cycle and
/// never caches the answer; implementations are free to cache internally but
/// should keep the result fresh enough for a polling cadence of minutes.
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// Discovery is an **observer** concern: implementations must not decide
/// whether an update is needed, and must not talk to the DNS provider.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Discover the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The current public IP
    /// - `Err(Error)`: When no discovery method succeeds
    async fn current(&self) -> Result<IpAddr, crate::Error>;
}

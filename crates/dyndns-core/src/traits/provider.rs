// # DNS Provider Trait
//
// Defines the interface for pushing record updates to a provider API.
//
// ## Implementations
//
// - Dinahosting: `dyndns-provider-dinahosting` crate
//
// Providers are external integrations and should stay:
// - **Isolated**: no knowledge of other collaborators or loop state
// - **Stateless**: no caching between requests
// - **Single-shot**: one API call per invocation; the loop owns scheduling
//   and retry-by-next-cycle, so providers must not sleep, retry, or spawn

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for DNS provider implementations
///
/// The loop invokes [`update_record`](DnsProvider::update_record) only when
/// it has already decided an update is needed (the discovered IP differs
/// from the published one), so implementations do not second-guess the
/// decision; they perform the call and report the provider's verdict.
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Update one subdomain's record to the given address
    ///
    /// # Parameters
    ///
    /// - `client`: The cycle's HTTP client, shared by every update in the cycle
    /// - `domain`: The registered domain name (e.g., "example.com")
    /// - `subdomain`: The subdomain label (e.g., "home")
    /// - `ip`: The address to publish
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider acknowledged the update
    /// - `Err(Error)`: Request construction, transport, or a response that
    ///   does not satisfy the provider's success contract. The error display
    ///   carries the status and body so the loop can log them.
    async fn update_record(
        &self,
        client: &reqwest::Client,
        domain: &str,
        subdomain: &str,
        ip: IpAddr,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

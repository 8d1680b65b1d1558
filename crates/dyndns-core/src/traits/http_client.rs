// # HTTP Client Factory Trait
//
// Defines the interface for building the HTTP client a cycle uses for its
// provider calls.
//
// The domain loop constructs one client per poll cycle, right after IP
// discovery succeeds, and reuses it for every subdomain update in that
// cycle. The client is private to its cycle and never shared across loops.

use crate::config::Settings;

/// Trait for HTTP client construction
///
/// Implementations honor the proxy and timeout settings; the default
/// implementation is [`DefaultClientFactory`](crate::http::DefaultClientFactory).
pub trait HttpClientFactory: Send + Sync {
    /// Build a client for one poll cycle
    ///
    /// # Parameters
    ///
    /// - `settings`: The shared process settings (timeout, proxy address)
    /// - `use_proxy`: Whether to route requests through the configured proxy
    fn make_client(
        &self,
        settings: &Settings,
        use_proxy: bool,
    ) -> Result<reqwest::Client, crate::Error>;
}

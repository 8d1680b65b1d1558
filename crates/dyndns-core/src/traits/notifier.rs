// # Notification Sink Trait
//
// Defines the interface for reporting a successful record update to the
// user (chat webhook, email, or just the log).
//
// Delivery is fire-and-forget from the loop's perspective: a sink that
// fails to deliver must handle (and log) that itself, never surface it.

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for update notification sinks
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Report that `hostname` now points at `ip`
    ///
    /// Infallible by contract; delivery failures are the sink's concern.
    async fn send(&self, hostname: &str, ip: IpAddr);
}

//! Log-backed notification sink
//!
//! The default [`NotificationSink`]: successful updates surface as info-level
//! log lines. Deployments that want chat or email delivery implement the
//! trait themselves and inject their sink into the loop.

use async_trait::async_trait;
use std::net::IpAddr;
use tracing::info;

use crate::traits::NotificationSink;

/// Notification sink that reports updates to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl LogNotifier {
    /// Create a new log notifier
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn send(&self, hostname: &str, ip: IpAddr) {
        info!("{} now points at {}", hostname, ip);
    }
}

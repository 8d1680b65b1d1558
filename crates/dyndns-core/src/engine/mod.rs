//! Per-domain update loop
//!
//! The DomainLoop is responsible for:
//! - Polling for the host's current public IP via IpSource
//! - Reading each subdomain's published IP via DnsResolver
//! - Pushing an update via DnsProvider when the two differ
//! - Reporting successful updates via NotificationSink
//!
//! ## Cycle Flow
//!
//! ```text
//! ┌──────────┐    discovery failed     ┌──────────┐
//! │ POLLING  │────────────────────────▶│ SLEEPING │
//! └──────────┘                         └──────────┘
//!      │ current IP                         ▲
//!      ▼                                    │
//! ┌─────────────────────┐  all subdomains   │
//! │ PER_SUBDOMAIN_UPDATE│───────────────────┘
//! └─────────────────────┘      (or TERMINATED when run_once)
//!   resolve → compare → update → notify, per label, in order
//! ```
//!
//! The first iteration polls immediately; only subsequent iterations sleep.
//!
//! ## Failure Semantics
//!
//! Anticipated I/O failures (discovery, resolution, transport, provider
//! rejection) are absorbed locally: logged, the affected subdomain or cycle
//! is skipped, and the work is retried naturally on the next cycle. They
//! never terminate the loop. Unexpected faults are not caught here at all —
//! the [`Supervisor`](crate::supervisor::Supervisor) monitors the loop task
//! and converts them into a single PanicSignal.
//!
//! ## Freshness
//!
//! The loop holds no memory of "last known IP" across cycles. Every cycle
//! re-discovers the current IP and re-resolves every subdomain, so the
//! update decision is always `current != published` against live data. An
//! externally-changed record is therefore repaired on the next cycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, error, info};

use crate::config::{Domain, Settings};
use crate::error::Result;
use crate::traits::{DnsProvider, DnsResolver, HttpClientFactory, IpSource, NotificationSink};

/// The per-domain update loop
///
/// One instance owns the polling cadence for one configured [`Domain`]. All
/// collaborators are constructor-injected; the shared [`Settings`] are read
/// but never mutated.
///
/// ## Lifecycle
///
/// 1. Create with [`DomainLoop::new()`]
/// 2. Drive with [`DomainLoop::run()`] (typically via the Supervisor)
/// 3. The loop returns after one pass (`run_once`) or runs until the process
///    stops or a shutdown signal arrives
pub struct DomainLoop {
    /// The domain this loop keeps updated
    domain: Domain,

    /// Shared process-wide settings
    settings: Arc<Settings>,

    /// Public-IP discovery
    ip_source: Arc<dyn IpSource>,

    /// Published-record resolution
    resolver: Arc<dyn DnsResolver>,

    /// Per-cycle HTTP client construction
    http_factory: Arc<dyn HttpClientFactory>,

    /// Provider API client
    provider: Arc<dyn DnsProvider>,

    /// Update notifications
    notifier: Arc<dyn NotificationSink>,
}

impl DomainLoop {
    /// Create a new domain loop
    ///
    /// Validates the settings and the domain before anything runs.
    pub fn new(
        domain: Domain,
        settings: Arc<Settings>,
        ip_source: Arc<dyn IpSource>,
        resolver: Arc<dyn DnsResolver>,
        http_factory: Arc<dyn HttpClientFactory>,
        provider: Arc<dyn DnsProvider>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<Self> {
        settings.validate()?;
        domain.validate()?;

        Ok(Self {
            domain,
            settings,
            ip_source,
            resolver,
            http_factory,
            provider,
            notifier,
        })
    }

    /// The domain this loop manages
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Run the loop
    ///
    /// # Parameters
    ///
    /// - `run_once`: perform exactly one poll cycle and return, instead of
    ///   sleeping and polling forever
    ///
    /// # Returns
    ///
    /// - `Ok(())`: single pass completed, or shutdown requested
    /// - `Err(Error)`: a fatal fault the loop could not absorb; the
    ///   supervisor turns this into a PanicSignal
    pub async fn run(&self, run_once: bool) -> Result<()> {
        self.run_with_shutdown(run_once, None).await
    }

    /// Run the loop with a cooperative shutdown signal
    ///
    /// The signal is observed while sleeping between cycles; a cycle that is
    /// already in flight finishes first. Used by tests and by embedders that
    /// need to stop a continuous loop without killing the process.
    pub async fn run_with_shutdown(
        &self,
        run_once: bool,
        mut shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()> {
        let interval = Duration::from_secs(self.settings.interval_secs);
        let mut first_cycle = true;

        loop {
            if !first_cycle {
                debug!(
                    "going to sleep, next check for {} in {} seconds",
                    self.domain.domain_name, self.settings.interval_secs
                );

                match shutdown_rx.as_mut() {
                    Some(rx) => {
                        tokio::select! {
                            _ = tokio::time::sleep(interval) => {}
                            _ = rx => {
                                info!("shutdown requested, stopping loop for {}", self.domain.domain_name);
                                return Ok(());
                            }
                        }
                    }
                    None => tokio::time::sleep(interval).await,
                }
            }
            first_cycle = false;

            self.run_cycle().await;

            if run_once {
                debug!("single pass for {} complete", self.domain.domain_name);
                return Ok(());
            }
        }
    }

    /// Run one poll cycle over every subdomain
    ///
    /// Anticipated failures are absorbed here: a discovery failure skips the
    /// whole cycle, a per-subdomain failure skips only that subdomain.
    async fn run_cycle(&self) {
        let current_ip = match self.ip_source.current().await {
            Ok(ip) => ip,
            Err(e) => {
                error!(
                    "failed to discover current IP for {}: {}",
                    self.domain.domain_name, e
                );
                return;
            }
        };
        debug!("current IP is {}", current_ip);

        // One client per cycle, shared by every subdomain update below.
        let client = match self
            .http_factory
            .make_client(&self.settings, self.settings.use_proxy)
        {
            Ok(client) => client,
            Err(e) => {
                error!("failed to build HTTP client: {}", e);
                return;
            }
        };

        for subdomain in &self.domain.sub_domains {
            let hostname = format!("{}.{}", subdomain, self.domain.domain_name);

            let published_ip = match self.resolver.resolve(&hostname).await {
                Ok(ip) => ip,
                Err(e) => {
                    error!("failed to resolve {}: {}", hostname, e);
                    continue;
                }
            };

            if current_ip == published_ip {
                info!(
                    "IP for {} is already {}, skipping update",
                    hostname, current_ip
                );
                continue;
            }

            match self
                .provider
                .update_record(&client, &self.domain.domain_name, subdomain, current_ip)
                .await
            {
                Ok(()) => {
                    info!("IP for {} updated to {}", hostname, current_ip);
                    self.notifier.send(&hostname, current_ip).await;
                }
                Err(e) => {
                    error!("failed to update {}: {}", hostname, e);
                }
            }
        }
    }
}

//! Loop supervision
//!
//! The Supervisor spawns each [`DomainLoop`] as a monitored task and turns
//! unrecoverable loop failures — a panic, or a fatal `Err` escaping
//! [`DomainLoop::run`] — into exactly one [`PanicSignal`] on a channel handed
//! to the caller at construction.
//!
//! The supervisor itself never restarts anything: the channel consumer (the
//! daemon, or an embedding application) owns the restart policy. Anticipated
//! I/O failures never reach this layer; the loop absorbs them.

use std::any::Any;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::config::Domain;
use crate::engine::DomainLoop;

/// Terminal-failure report for one domain loop
///
/// Sent at most once per crash; a loop that terminates normally (single
/// pass, shutdown signal) produces no signal.
#[derive(Debug, Clone)]
pub struct PanicSignal {
    /// The domain whose loop failed
    pub domain: Domain,

    /// Human-readable failure description (panic payload or error display)
    pub reason: String,
}

/// Spawns and monitors domain loops
///
/// ## Usage
///
/// ```rust,ignore
/// let (mut supervisor, mut panic_rx) = Supervisor::new(domains.len());
/// for domain in domains {
///     supervisor.spawn(make_loop(domain)?, false);
/// }
/// while let Some(signal) = panic_rx.recv().await {
///     // restart, alert, or give up — caller's policy
/// }
/// ```
pub struct Supervisor {
    /// Failure reports to the channel consumer
    panic_tx: mpsc::Sender<PanicSignal>,

    /// Monitor tasks, one per spawned loop
    handles: Vec<JoinHandle<()>>,
}

impl Supervisor {
    /// Create a supervisor and the receiving end of its failure channel
    ///
    /// `capacity` bounds the failure channel; one slot per domain is plenty,
    /// since each loop reports at most once per invocation.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<PanicSignal>) {
        let (panic_tx, panic_rx) = mpsc::channel(capacity.max(1));

        let supervisor = Self {
            panic_tx,
            handles: Vec::new(),
        };

        (supervisor, panic_rx)
    }

    /// Spawn a domain loop as a monitored task
    ///
    /// The loop runs on its own task; a sibling loop's crash never affects
    /// it. A fatal `Err` or a panic produces one [`PanicSignal`] carrying the
    /// loop's domain; normal termination produces nothing.
    pub fn spawn(&mut self, domain_loop: DomainLoop, run_once: bool) {
        let domain = domain_loop.domain().clone();
        let panic_tx = self.panic_tx.clone();

        let handle = tokio::spawn(async move {
            // The loop runs on a nested task so its panic surfaces here as a
            // JoinError instead of tearing down the monitor.
            let task = tokio::spawn(async move { domain_loop.run(run_once).await });

            let reason = match task.await {
                Ok(Ok(())) => {
                    debug!("loop for {} finished", domain.domain_name);
                    return;
                }
                Ok(Err(e)) => {
                    error!("loop for {} failed: {}", domain.domain_name, e);
                    e.to_string()
                }
                Err(join_err) if join_err.is_panic() => {
                    let reason = panic_reason(join_err.into_panic());
                    error!("loop for {} panicked: {}", domain.domain_name, reason);
                    reason
                }
                Err(join_err) => {
                    error!("loop task for {} was lost: {}", domain.domain_name, join_err);
                    join_err.to_string()
                }
            };

            if panic_tx.send(PanicSignal { domain, reason }).await.is_err() {
                warn!("supervisor channel closed, dropping crash report");
            }
        });

        self.handles.push(handle);
    }

    /// Await completion of every spawned loop
    ///
    /// Used in single-pass mode: all loops terminate on their own after one
    /// cycle. Crash reports for any loop that failed are already on the
    /// channel when this returns.
    pub async fn join_all(&mut self) {
        for handle in self.handles.drain(..) {
            // Monitor tasks never panic themselves; a join error here means
            // the runtime is shutting down.
            let _ = handle.await;
        }
    }
}

/// Render a panic payload as text
fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

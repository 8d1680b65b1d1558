// # dyndns-core
//
// Core library for the dyndns update agent.
//
// ## Architecture Overview
//
// This library provides the core functionality for keeping DNS records
// pointed at the host's current public IP:
// - **IpSource**: Trait for discovering the current public IP
// - **DnsResolver**: Trait for reading the currently-published IP of a hostname
// - **HttpClientFactory**: Trait for building the per-cycle HTTP client
// - **DnsProvider**: Trait for pushing record updates to a provider API
// - **NotificationSink**: Trait for reporting successful updates
// - **DomainLoop**: The per-domain poll/compare/update loop
// - **Supervisor**: Task monitoring that turns loop crashes into PanicSignals
//
// ## Design Principles
//
// 1. **Separation of Concerns**: The loop owns decisions; collaborators own I/O
// 2. **Dependency Injection**: Every collaborator is constructor-injected
// 3. **Fresh Comparison**: No IP is cached across cycles; the published DNS
//    record is re-resolved every time, so the loop self-heals after external
//    record changes
// 4. **Local Absorption**: Anticipated I/O failures are logged and retried on
//    the next cycle; only unexpected faults reach the supervisor

pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod notify;
pub mod supervisor;
pub mod traits;

// Re-export core types for convenience
pub use config::{Domain, IpVersion, Settings};
pub use engine::DomainLoop;
pub use error::{Error, Result};
pub use http::DefaultClientFactory;
pub use notify::LogNotifier;
pub use supervisor::{PanicSignal, Supervisor};
pub use traits::{DnsProvider, DnsResolver, HttpClientFactory, IpSource, NotificationSink};

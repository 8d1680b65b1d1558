//! Core traits for the update agent
//!
//! This module defines the collaborator interfaces the domain loop consumes.
//!
//! - [`IpSource`]: Discover the host's current public IP
//! - [`DnsResolver`]: Read the currently-published IP for a hostname
//! - [`HttpClientFactory`]: Build the per-cycle HTTP client
//! - [`DnsProvider`]: Push record updates to the provider API
//! - [`NotificationSink`]: Report successful updates

pub mod http_client;
pub mod ip_source;
pub mod notifier;
pub mod provider;
pub mod resolver;

pub use http_client::HttpClientFactory;
pub use ip_source::IpSource;
pub use notifier::NotificationSink;
pub use provider::DnsProvider;
pub use resolver::DnsResolver;

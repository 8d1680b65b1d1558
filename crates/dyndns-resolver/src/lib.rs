// # DNS Resolver
//
// This crate provides the published-record resolution collaborator for the
// update agent.
//
// ## Architecture
//
// Resolves `subdomain.domain` hostnames through a trust-dns
// `TokioAsyncResolver`, either against the configured UDP endpoint (host or
// host:port, port defaulting to 53) or against the library's stock
// configuration. The lookup strategy is pinned to the configured address
// family, so a dual-stacked name can never answer with the wrong family.
//
// The resolver is queried fresh every cycle; it is the agent's only source
// of truth for what a record currently publishes.

use async_trait::async_trait;
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::config::{
    LookupIpStrategy, NameServerConfig, Protocol, ResolverConfig, ResolverOpts,
};

use dyndns_core::config::IpVersion;
use dyndns_core::error::{Error, Result};
use dyndns_core::traits::DnsResolver;

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Default DNS port for bare-host resolver endpoints
const DEFAULT_DNS_PORT: u16 = 53;

/// Published-record resolver backed by trust-dns
pub struct TrustDnsResolver {
    resolver: TokioAsyncResolver,
}

impl TrustDnsResolver {
    /// Create a new resolver
    ///
    /// # Parameters
    ///
    /// - `endpoint`: UDP resolver to query (host or host:port); `None` uses
    ///   the library's stock configuration
    /// - `version`: Address family to resolve
    /// - `timeout`: Per-lookup timeout
    pub fn new(endpoint: Option<&str>, version: IpVersion, timeout: Duration) -> Result<Self> {
        let config = match endpoint {
            Some(endpoint) => {
                let addr = parse_endpoint(endpoint)?;
                let mut config = ResolverConfig::new();
                config.add_name_server(NameServerConfig::new(addr, Protocol::Udp));
                config
            }
            None => ResolverConfig::default(),
        };

        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.ip_strategy = match version {
            IpVersion::V4 => LookupIpStrategy::Ipv4Only,
            IpVersion::V6 => LookupIpStrategy::Ipv6Only,
        };

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        })
    }
}

/// Parse a resolver endpoint into a socket address
///
/// Accepts "1.2.3.4", "1.2.3.4:5353", "::1", and "[::1]:5353" forms.
fn parse_endpoint(endpoint: &str) -> Result<SocketAddr> {
    if let Ok(addr) = endpoint.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = endpoint.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_DNS_PORT));
    }
    Err(Error::config(format!(
        "invalid resolver endpoint: {}",
        endpoint
    )))
}

#[async_trait]
impl DnsResolver for TrustDnsResolver {
    async fn resolve(&self, hostname: &str) -> Result<IpAddr> {
        let lookup = self
            .resolver
            .lookup_ip(hostname)
            .await
            .map_err(|e| Error::resolve(format!("lookup for {} failed: {}", hostname, e)))?;

        lookup
            .iter()
            .next()
            .ok_or_else(|| Error::resolve(format!("no address records for {}", hostname)))
    }
}

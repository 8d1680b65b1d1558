// # HTTP IP Source
//
// This crate provides the HTTP-based IP discovery collaborator for the
// update agent.
//
// ## Architecture
//
// Fetches the current public IP from external plain-text services
// (e.g. api.ipify.org, icanhazip.com). Services are tried in order and the
// first answer that parses and matches the configured address family wins;
// discovery fails only when every service fails.
//
// The source holds no cache: the domain loop re-polls every cycle by
// design, and a cache here would hide address changes from it.

use async_trait::async_trait;
use tracing::{debug, warn};

use dyndns_core::config::{IpVersion, Settings};
use dyndns_core::error::{Error, Result};
use dyndns_core::traits::IpSource;

use std::net::IpAddr;
use std::time::Duration;

/// Stock IP discovery services, tried in order
pub const DEFAULT_IP_SERVICES: &[&str] = &[
    "https://api.ipify.org",  // returns plain text IP
    "https://ifconfig.me/ip", // no rate limit documented
    "https://icanhazip.com",  // no rate limit documented
];

/// HTTP-based public IP discovery
pub struct HttpIpSource {
    /// Service URLs, tried in order
    urls: Vec<String>,

    /// Address family to accept
    version: IpVersion,

    /// HTTP client for discovery requests
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `urls`: Plain-text IP services, tried in order
    /// - `version`: Address family to accept
    /// - `timeout`: Per-request timeout
    pub fn new(urls: Vec<String>, version: IpVersion, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            urls,
            version,
            client,
        })
    }

    /// Create a source from the shared settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.ip_urls.clone(),
            settings.ip_version,
            Duration::from_secs(settings.http_timeout_secs),
        )
    }

    /// Create a source using the stock service list
    pub fn with_default_services(version: IpVersion, timeout: Duration) -> Result<Self> {
        Self::new(
            DEFAULT_IP_SERVICES.iter().map(|s| s.to_string()).collect(),
            version,
            timeout,
        )
    }

    /// Fetch and parse the IP from one service
    async fn fetch(&self, url: &str) -> Result<IpAddr> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::http(format!(
                "{} answered {}",
                url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("failed to read response from {}: {}", url, e)))?;

        parse_ip(body.trim(), self.version)
    }
}

/// Parse a service's answer and check it against the wanted address family
fn parse_ip(text: &str, version: IpVersion) -> Result<IpAddr> {
    let ip: IpAddr = text
        .parse()
        .map_err(|_| Error::ip_discovery(format!("not an IP address: {:?}", text)))?;

    if !version.matches(ip) {
        return Err(Error::ip_discovery(format!(
            "expected an {} address, got {}",
            match version {
                IpVersion::V4 => "IPv4",
                IpVersion::V6 => "IPv6",
            },
            ip
        )));
    }

    Ok(ip)
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<IpAddr> {
        for url in &self.urls {
            match self.fetch(url).await {
                Ok(ip) => {
                    debug!("discovered current IP {} via {}", ip, url);
                    return Ok(ip);
                }
                Err(e) => {
                    warn!("IP discovery via {} failed: {}", url, e);
                }
            }
        }

        Err(Error::ip_discovery("no IP discovery service succeeded"))
    }
}

//! Default HTTP client construction
//!
//! One client is built per poll cycle, after IP discovery succeeds, and
//! reused for every subdomain update in that cycle.

use std::time::Duration;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::traits::HttpClientFactory;

/// Default [`HttpClientFactory`]: honors the configured request timeout and,
/// when asked, the configured SOCKS5 proxy.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultClientFactory;

impl DefaultClientFactory {
    /// Create the default factory
    pub fn new() -> Self {
        Self
    }
}

impl HttpClientFactory for DefaultClientFactory {
    fn make_client(&self, settings: &Settings, use_proxy: bool) -> Result<reqwest::Client> {
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(settings.http_timeout_secs));

        if use_proxy {
            let address = settings.socks5_proxy.as_deref().ok_or_else(|| {
                Error::config("use_proxy is set but no SOCKS5 proxy is configured")
            })?;
            let proxy = reqwest::Proxy::all(address).map_err(|e| {
                Error::config(format!("invalid SOCKS5 proxy address {}: {}", address, e))
            })?;
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {}", e)))
    }
}

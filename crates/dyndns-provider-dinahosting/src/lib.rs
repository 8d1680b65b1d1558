// # Dinahosting DNS Provider
//
// This crate provides the Dinahosting provider implementation for the
// update agent.
//
// ## API
//
// Dinahosting exposes record updates through a single templated endpoint:
//
// ```http
// POST /special/api.php?command=Domain_Zone_UpdateTypeA
//      &domain={domain}&hostname={subdomain}&ip={ip}&responseType=Json
// Authorization: Basic base64(email:password)
// Content-Type: application/json
// ```
//
// Success is signaled by the response body containing the literal substring
// `"responseCode":1000`. That substring IS the contract: the body is never
// parsed as JSON, because the rest of the schema is not exercised and the
// API has been observed returning it with inconsistent framing. Any other
// body, status, or transport error is a failure.
//
// ## Constraints
//
// The provider is single-shot and stateless: one API call per invocation,
// no retry, no backoff, no caching, no spawned tasks. The domain loop owns
// scheduling and retries work naturally on its next cycle. The HTTP client
// is passed in per cycle so every subdomain update of a cycle shares one
// connection pool.
//
// ## Security
//
// - Credentials NEVER appear in logs
// - The Debug implementation redacts the password

use async_trait::async_trait;
use reqwest::header;
use tracing::debug;

use dyndns_core::config::Settings;
use dyndns_core::error::{Error, Result};
use dyndns_core::traits::DnsProvider;

use std::fmt;
use std::net::IpAddr;

/// Dinahosting API endpoint for record updates
const DINAHOSTING_API_URL: &str = "https://dinahosting.com/special/api.php";

/// API command that rewrites a zone's type-A record
const UPDATE_COMMAND: &str = "Domain_Zone_UpdateTypeA";

/// Literal substring that marks a successful update response
const SUCCESS_MARKER: &str = r#""responseCode":1000"#;

/// Dinahosting DNS provider
///
/// Holds only the account credentials and the optional user-agent; the HTTP
/// client arrives with each call.
pub struct DinahostingProvider {
    /// Account email (Basic auth user)
    email: String,

    /// Account password (Basic auth secret)
    /// ⚠️ NEVER log this value
    password: String,

    /// Optional User-Agent header for API requests
    user_agent: Option<String>,
}

// Custom Debug implementation that hides the account password
impl fmt::Debug for DinahostingProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DinahostingProvider")
            .field("email", &self.email)
            .field("password", &"<REDACTED>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl DinahostingProvider {
    /// Create a new Dinahosting provider
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            user_agent,
        }
    }

    /// Create a provider from the shared settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.email.clone(),
            settings.password.clone(),
            settings.user_agent.clone(),
        )
    }

    /// Build the templated update URL with percent-encoded parameters
    fn endpoint(domain: &str, subdomain: &str, ip: IpAddr) -> Result<reqwest::Url> {
        let ip = ip.to_string();
        reqwest::Url::parse_with_params(
            DINAHOSTING_API_URL,
            &[
                ("command", UPDATE_COMMAND),
                ("domain", domain),
                ("hostname", subdomain),
                ("ip", ip.as_str()),
                ("responseType", "Json"),
            ],
        )
        .map_err(|e| {
            Error::invalid_input(format!(
                "failed to build update URL for {}.{}: {}",
                subdomain, domain, e
            ))
        })
    }
}

/// Apply the provider's success contract to a response body
fn is_success_body(body: &str) -> bool {
    body.contains(SUCCESS_MARKER)
}

#[async_trait]
impl DnsProvider for DinahostingProvider {
    /// Push one subdomain's A record to the given address
    ///
    /// Makes exactly one POST; the error carries the response status and
    /// body so the loop can log a rejected update in full.
    async fn update_record(
        &self,
        client: &reqwest::Client,
        domain: &str,
        subdomain: &str,
        ip: IpAddr,
    ) -> Result<()> {
        let url = Self::endpoint(domain, subdomain, ip)?;
        debug!("updating {}.{} via {}", subdomain, domain, DINAHOSTING_API_URL);

        let mut request = client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .basic_auth(&self.email, Some(&self.password));

        if let Some(user_agent) = &self.user_agent {
            request = request.header(header::USER_AGENT, user_agent);
        }

        let response = request.send().await.map_err(|e| {
            Error::http(format!(
                "update request for {}.{} failed: {}",
                subdomain, domain, e
            ))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::http(format!(
                "failed to read update response for {}.{}: {}",
                subdomain, domain, e
            ))
        })?;

        if !is_success_body(&body) {
            return Err(Error::provider(
                "dinahosting",
                format!(
                    "update for {}.{} rejected: status={}, body={}",
                    subdomain, domain, status, body
                ),
            ));
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "dinahosting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_carries_all_update_parameters() {
        let url =
            DinahostingProvider::endpoint("example.com", "home", "1.2.3.4".parse().unwrap())
                .unwrap();

        let url = url.as_str();
        assert!(url.starts_with("https://dinahosting.com/special/api.php?"));
        assert!(url.contains("command=Domain_Zone_UpdateTypeA"));
        assert!(url.contains("domain=example.com"));
        assert!(url.contains("hostname=home"));
        assert!(url.contains("ip=1.2.3.4"));
        assert!(url.contains("responseType=Json"));
    }

    #[test]
    fn endpoint_percent_encodes_parameters() {
        let url = DinahostingProvider::endpoint("example.com", "a&b", "1.2.3.4".parse().unwrap())
            .unwrap();
        assert!(url.as_str().contains("hostname=a%26b"));
        assert!(!url.as_str().contains("hostname=a&b"));
    }

    #[test]
    fn success_contract_is_a_literal_substring() {
        assert!(is_success_body(r#"{"responseCode":1000}"#));
        assert!(is_success_body(
            r#"{"trId":"abc","responseCode":1000,"message":"Ip updated"}"#
        ));

        // The auth-failure body from the API, and near-miss framings, are
        // all failures: the contract is the exact substring.
        assert!(!is_success_body(
            r#"{"responseCode":1001,"msg":"auth failed"}"#
        ));
        assert!(!is_success_body(r#"{"responseCode": 1000}"#));
        assert!(!is_success_body(""));
        assert!(!is_success_body("<html>service unavailable</html>"));
    }

    #[test]
    fn password_not_exposed_in_debug() {
        let provider = DinahostingProvider::new("user@example.com", "secret-password-123", None);
        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret-password-123"));
        assert!(debug_str.contains("<REDACTED>"));
        assert!(debug_str.contains("DinahostingProvider"));
    }

    #[test]
    fn from_settings_copies_credentials_and_user_agent() {
        use dyndns_core::config::{IpVersion, Settings};

        let settings = Settings {
            interval_secs: 300,
            use_proxy: false,
            socks5_proxy: None,
            resolver: None,
            ip_version: IpVersion::V4,
            email: "user@example.com".to_string(),
            password: "hunter2".to_string(),
            user_agent: Some("dyndns/0.1".to_string()),
            http_timeout_secs: 30,
            ip_urls: vec!["https://api.ipify.org".to_string()],
            domains: Vec::new(),
        };

        let provider = DinahostingProvider::from_settings(&settings);
        assert_eq!(provider.email, "user@example.com");
        assert_eq!(provider.password, "hunter2");
        assert_eq!(provider.user_agent.as_deref(), Some("dyndns/0.1"));
    }

    #[test]
    fn provider_name_is_stable() {
        let provider = DinahostingProvider::new("user@example.com", "pw", None);
        assert_eq!(provider.provider_name(), "dinahosting");
    }
}

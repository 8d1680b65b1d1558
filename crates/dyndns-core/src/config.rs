//! Configuration types for the update agent
//!
//! `Settings` holds the process-wide configuration; it is wrapped in an
//! `Arc` and shared read-only across every domain loop. `Domain` is the
//! per-loop unit of work: one registered domain plus the ordered set of
//! subdomain labels to keep updated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Process-wide settings, shared read-only across all domain loops
#[derive(Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Seconds between poll cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Route provider and discovery traffic through the SOCKS5 proxy
    #[serde(default)]
    pub use_proxy: bool,

    /// SOCKS5 proxy address, e.g. "socks5://127.0.0.1:1080"
    #[serde(default)]
    pub socks5_proxy: Option<String>,

    /// Resolver endpoint used to read published records (host or host:port,
    /// port defaults to 53). `None` uses the resolver's stock configuration.
    #[serde(default)]
    pub resolver: Option<String>,

    /// Address family to discover and publish
    #[serde(default = "default_ip_version")]
    pub ip_version: IpVersion,

    /// Provider account email (Basic auth user)
    pub email: String,

    /// Provider account password (Basic auth secret)
    /// ⚠️ NEVER log this value
    pub password: String,

    /// Optional User-Agent header for provider requests
    #[serde(default)]
    pub user_agent: Option<String>,

    /// HTTP timeout in seconds for provider and discovery requests
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Plain-text IP discovery services, tried in order
    #[serde(default = "default_ip_urls")]
    pub ip_urls: Vec<String>,

    /// Domains to keep updated
    #[serde(default)]
    pub domains: Vec<Domain>,
}

impl Settings {
    /// Create settings with defaults for everything but the required fields
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        domains: Vec<Domain>,
    ) -> Self {
        Self {
            interval_secs: default_interval_secs(),
            use_proxy: false,
            socks5_proxy: None,
            resolver: None,
            ip_version: default_ip_version(),
            email: email.into(),
            password: password.into(),
            user_agent: None,
            http_timeout_secs: default_http_timeout_secs(),
            ip_urls: default_ip_urls(),
            domains,
        }
    }

    /// Validate the process-wide settings
    ///
    /// Domain syntax is validated per [`Domain::validate`]; whether the
    /// domain list may be empty is the caller's policy (the daemon requires
    /// at least one, embedders may drive loops directly).
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.email.is_empty() {
            return Err(crate::Error::config("provider email cannot be empty"));
        }
        if self.password.is_empty() {
            return Err(crate::Error::config("provider password cannot be empty"));
        }
        if self.interval_secs == 0 {
            return Err(crate::Error::config(
                "polling interval must be at least 1 second",
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(crate::Error::config(
                "HTTP timeout must be at least 1 second",
            ));
        }
        if self.ip_urls.is_empty() {
            return Err(crate::Error::config(
                "at least one IP discovery URL is required",
            ));
        }
        for url in &self.ip_urls {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(crate::Error::config(format!(
                    "IP discovery URL must use HTTP or HTTPS: {}",
                    url
                )));
            }
        }
        if self.use_proxy {
            match self.socks5_proxy.as_deref() {
                Some(addr) if addr.starts_with("socks5://") => {}
                Some(addr) => {
                    return Err(crate::Error::config(format!(
                        "SOCKS5 proxy address must start with socks5://, got: {}",
                        addr
                    )));
                }
                None => {
                    return Err(crate::Error::config(
                        "use_proxy is set but no SOCKS5 proxy is configured",
                    ));
                }
            }
        }
        for domain in &self.domains {
            domain.validate()?;
        }

        Ok(())
    }
}

// Custom Debug implementation that hides the provider credentials
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("interval_secs", &self.interval_secs)
            .field("use_proxy", &self.use_proxy)
            .field("socks5_proxy", &self.socks5_proxy)
            .field("resolver", &self.resolver)
            .field("ip_version", &self.ip_version)
            .field("email", &self.email)
            .field("password", &"<REDACTED>")
            .field("user_agent", &self.user_agent)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("ip_urls", &self.ip_urls)
            .field("domains", &self.domains)
            .finish()
    }
}

/// Address family to discover and publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    /// IPv4 only
    V4,
    /// IPv6 only
    V6,
}

impl IpVersion {
    /// Whether the given address belongs to this family
    pub fn matches(self, ip: IpAddr) -> bool {
        match self {
            IpVersion::V4 => ip.is_ipv4(),
            IpVersion::V6 => ip.is_ipv6(),
        }
    }
}

/// One registered domain plus the subdomain labels to keep updated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    /// Registered domain name (e.g., "example.com")
    pub domain_name: String,

    /// Subdomain labels, processed in this order every cycle
    pub sub_domains: Vec<String>,
}

impl Domain {
    /// Create a new domain configuration
    pub fn new(domain_name: impl Into<String>, sub_domains: Vec<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
            sub_domains,
        }
    }

    /// Validate the domain name and every subdomain label
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_domain_name(&self.domain_name)?;
        if self.sub_domains.is_empty() {
            return Err(crate::Error::config(format!(
                "domain {} has no subdomains to update",
                self.domain_name
            )));
        }
        for label in &self.sub_domains {
            validate_label(label)?;
        }
        Ok(())
    }
}

/// Validate that a string is a valid domain name
///
/// Basic DNS name validation per RFC 1035. Not comprehensive, but it
/// catches common configuration mistakes before the first cycle runs.
fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::config("domain name cannot be empty"));
    }

    // Total length limit (RFC 1035: 253 chars max)
    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "domain name too long: {} chars (max 253): {}",
            domain.len(),
            domain
        )));
    }

    for label in domain.split('.') {
        validate_label(label)?;
    }

    Ok(())
}

/// Validate a single DNS label (a subdomain entry or one dot-separated
/// segment of a domain name)
fn validate_label(label: &str) -> Result<(), crate::Error> {
    if label.is_empty() {
        return Err(crate::Error::config("DNS label cannot be empty"));
    }

    if label.len() > 63 {
        return Err(crate::Error::config(format!(
            "DNS label too long: {} chars (max 63): {}",
            label.len(),
            label
        )));
    }

    if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(crate::Error::config(format!(
            "DNS label contains invalid characters: {} (alphanumeric and hyphen only)",
            label
        )));
    }

    if label.starts_with('-') || label.ends_with('-') {
        return Err(crate::Error::config(format!(
            "DNS label cannot start or end with a hyphen: {}",
            label
        )));
    }

    Ok(())
}

fn default_interval_secs() -> u64 {
    300
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_ip_version() -> IpVersion {
    IpVersion::V4
}

fn default_ip_urls() -> Vec<String> {
    vec![
        "https://api.ipify.org".to_string(),
        "https://ifconfig.me/ip".to_string(),
        "https://icanhazip.com".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        Settings {
            interval_secs: default_interval_secs(),
            use_proxy: false,
            socks5_proxy: None,
            resolver: None,
            ip_version: IpVersion::V4,
            email: "agent@example.com".to_string(),
            password: "hunter2".to_string(),
            user_agent: None,
            http_timeout_secs: default_http_timeout_secs(),
            ip_urls: default_ip_urls(),
            domains: vec![Domain::new("example.com", vec!["home".to_string()])],
        }
    }

    #[test]
    fn valid_settings_pass_validation() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn empty_password_is_rejected() {
        let mut settings = valid_settings();
        settings.password = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut settings = valid_settings();
        settings.interval_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn proxy_flag_requires_proxy_address() {
        let mut settings = valid_settings();
        settings.use_proxy = true;
        assert!(settings.validate().is_err());

        settings.socks5_proxy = Some("http://127.0.0.1:1080".to_string());
        assert!(settings.validate().is_err());

        settings.socks5_proxy = Some("socks5://127.0.0.1:1080".to_string());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn discovery_urls_must_be_http() {
        let mut settings = valid_settings();
        settings.ip_urls = vec!["ftp://example.com".to_string()];
        assert!(settings.validate().is_err());
    }

    #[test]
    fn password_not_exposed_in_debug() {
        let settings = valid_settings();
        let debug_str = format!("{:?}", settings);
        assert!(!debug_str.contains("hunter2"));
        assert!(debug_str.contains("<REDACTED>"));
    }

    #[test]
    fn domain_validation_rejects_bad_labels() {
        assert!(Domain::new("example.com", vec!["home".to_string()]).validate().is_ok());
        assert!(Domain::new("example.com", Vec::new()).validate().is_err());
        assert!(Domain::new("example.com", vec!["-home".to_string()]).validate().is_err());
        assert!(Domain::new("example.com", vec!["ho me".to_string()]).validate().is_err());
        assert!(Domain::new("", vec!["home".to_string()]).validate().is_err());
        assert!(Domain::new("exa mple.com", vec!["home".to_string()]).validate().is_err());
        assert!(Domain::new("a".repeat(254), vec!["home".to_string()]).validate().is_err());
    }

    #[test]
    fn ip_version_matches_family() {
        let v4: IpAddr = "1.2.3.4".parse().unwrap();
        let v6: IpAddr = "2001:db8::1".parse().unwrap();
        assert!(IpVersion::V4.matches(v4));
        assert!(!IpVersion::V4.matches(v6));
        assert!(IpVersion::V6.matches(v6));
        assert!(!IpVersion::V6.matches(v4));
    }

    #[test]
    fn settings_round_trip_through_json() {
        let settings = valid_settings();
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.email, settings.email);
        assert_eq!(parsed.domains, settings.domains);
    }

    #[test]
    fn settings_defaults_apply_when_fields_are_omitted() {
        let json = r#"{
            "email": "agent@example.com",
            "password": "hunter2",
            "domains": [{"domain_name": "example.com", "sub_domains": ["home"]}]
        }"#;
        let parsed: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.interval_secs, 300);
        assert_eq!(parsed.http_timeout_secs, 30);
        assert_eq!(parsed.ip_version, IpVersion::V4);
        assert_eq!(parsed.ip_urls.len(), 3);
        assert!(!parsed.use_proxy);
    }
}

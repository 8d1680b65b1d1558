// # dyndnsd - Update Agent Daemon
//
// This is a THIN integration layer: it reads configuration, wires the
// collaborators together, and hands the domain loops to the supervisor.
// All update logic lives in dyndns-core.
//
// ## Configuration
//
// Either point `DYNDNS_CONFIG` at a JSON settings file, or configure via
// environment variables:
//
// ### Required
// - `DYNDNS_EMAIL`: Dinahosting account email
// - `DYNDNS_PASSWORD`: Dinahosting account password
// - `DYNDNS_DOMAINS`: Domains and subdomains to keep updated, e.g.
//   `example.com:home,office;other.org:www`
//
// ### Optional
// - `DYNDNS_INTERVAL`: Seconds between poll cycles (default 300)
// - `DYNDNS_RESOLVER`: DNS endpoint for reading published records
//   (host or host:port)
// - `DYNDNS_IP_TYPE`: Address family, `ipv4` or `ipv6` (default ipv4)
// - `DYNDNS_IP_URLS`: Comma-separated plain-text IP discovery services
// - `DYNDNS_USE_PROXY`: Route HTTP traffic through the SOCKS5 proxy
// - `DYNDNS_SOCKS5_PROXY`: Proxy address, e.g. `socks5://127.0.0.1:1080`
// - `DYNDNS_USER_AGENT`: Custom User-Agent for provider requests
// - `DYNDNS_HTTP_TIMEOUT`: HTTP timeout in seconds (default 30)
// - `DYNDNS_RUN_ONCE`: Perform one pass over every domain, then exit
// - `DYNDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export DYNDNS_EMAIL=you@example.com
// export DYNDNS_PASSWORD=...
// export DYNDNS_DOMAINS=example.com:home,office
// export DYNDNS_INTERVAL=300
//
// dyndnsd
// ```

use anyhow::{Context, Result, bail};
use std::env;
use std::fs;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use dyndns_core::config::{Domain, IpVersion, Settings};
use dyndns_core::engine::DomainLoop;
use dyndns_core::http::DefaultClientFactory;
use dyndns_core::notify::LogNotifier;
use dyndns_core::supervisor::Supervisor;
use dyndns_core::traits::{
    DnsProvider, DnsResolver, HttpClientFactory, IpSource, NotificationSink,
};
use dyndns_ip_http::HttpIpSource;
use dyndns_provider_dinahosting::DinahostingProvider;
use dyndns_resolver::TrustDnsResolver;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum AgentExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<AgentExitCode> for ExitCode {
    fn from(code: AgentExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon configuration: the shared settings plus run-mode flags
struct Config {
    settings: Settings,
    run_once: bool,
    log_level: String,
}

impl Config {
    /// Load configuration from the environment (or the JSON file it names)
    fn from_env() -> Result<Self> {
        let run_once = env_flag("DYNDNS_RUN_ONCE");
        let log_level = env::var("DYNDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let settings = if let Some(path) = env_string("DYNDNS_CONFIG") {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file {}", path))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse config file {}", path))?
        } else {
            let email = env::var("DYNDNS_EMAIL").context(
                "DYNDNS_EMAIL is required. \
                Set it via: export DYNDNS_EMAIL=you@example.com",
            )?;
            let password = env::var("DYNDNS_PASSWORD").context(
                "DYNDNS_PASSWORD is required. \
                Set it via: export DYNDNS_PASSWORD=your_account_password",
            )?;
            let raw_domains = env::var("DYNDNS_DOMAINS").context(
                "DYNDNS_DOMAINS is required. \
                Set it via: export DYNDNS_DOMAINS=example.com:home,office",
            )?;

            let mut settings = Settings::new(email, password, parse_domains(&raw_domains)?);

            if let Some(interval) = env_u64("DYNDNS_INTERVAL")? {
                settings.interval_secs = interval;
            }
            if let Some(timeout) = env_u64("DYNDNS_HTTP_TIMEOUT")? {
                settings.http_timeout_secs = timeout;
            }
            if let Some(raw) = env_string("DYNDNS_IP_TYPE") {
                settings.ip_version = parse_ip_version(&raw)?;
            }
            if let Some(urls) = env_string("DYNDNS_IP_URLS") {
                settings.ip_urls = urls
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            settings.resolver = env_string("DYNDNS_RESOLVER");
            settings.user_agent = env_string("DYNDNS_USER_AGENT");
            settings.use_proxy = env_flag("DYNDNS_USE_PROXY");
            settings.socks5_proxy = env_string("DYNDNS_SOCKS5_PROXY");

            settings
        };

        Ok(Self {
            settings,
            run_once,
            log_level,
        })
    }

    /// Validate the loaded configuration
    fn validate(&self) -> Result<()> {
        if self.settings.domains.is_empty() {
            bail!(
                "at least one domain is required. \
                Set DYNDNS_DOMAINS=example.com:home,office or list domains in the config file"
            );
        }

        // Check for obvious placeholder credentials (common mistake)
        let password_lower = self.settings.password.to_lowercase();
        if password_lower.contains("your_password")
            || password_lower.contains("replace_me")
            || password_lower == "password"
        {
            bail!(
                "DYNDNS_PASSWORD appears to be a placeholder. \
                Use your actual Dinahosting account password."
            );
        }

        self.settings.validate()?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => bail!(
                "DYNDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

/// Parse the `domain:sub,sub;domain:sub` domain-list syntax
fn parse_domains(raw: &str) -> Result<Vec<Domain>> {
    let mut domains = Vec::new();

    for entry in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, subs) = entry.split_once(':').with_context(|| {
            format!(
                "domain entry '{}' must look like example.com:home,office",
                entry
            )
        })?;

        let sub_domains: Vec<String> = subs
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if sub_domains.is_empty() {
            bail!("domain entry '{}' names no subdomains", entry);
        }

        domains.push(Domain::new(name.trim(), sub_domains));
    }

    if domains.is_empty() {
        bail!("DYNDNS_DOMAINS must name at least one domain, e.g. example.com:home,office");
    }

    Ok(domains)
}

fn parse_ip_version(raw: &str) -> Result<IpVersion> {
    match raw.to_lowercase().as_str() {
        "v4" | "ipv4" => Ok(IpVersion::V4),
        "v6" | "ipv6" => Ok(IpVersion::V6),
        other => bail!(
            "DYNDNS_IP_TYPE '{}' is not supported. Supported: ipv4, ipv6",
            other
        ),
    }
}

/// Read a non-empty environment string
fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}

/// Read an integer environment variable, rejecting unparseable values
fn env_u64(name: &str) -> Result<Option<u64>> {
    match env::var(name) {
        Ok(raw) => {
            let value = raw
                .parse()
                .with_context(|| format!("{} must be an integer, got '{}'", name, raw))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}

/// Read a boolean flag environment variable
fn env_flag(name: &str) -> bool {
    matches!(
        env::var(name).unwrap_or_default().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return AgentExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return AgentExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return AgentExitCode::ConfigError.into();
    }

    info!("Starting dyndnsd");
    info!(
        "Configuration loaded: {} domain(s), polling every {}s",
        config.settings.domains.len(),
        config.settings.interval_secs
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return AgentExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {:#}", e);
            AgentExitCode::RuntimeError
        } else {
            AgentExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let run_once = config.run_once;
    let settings = Arc::new(config.settings);

    // Build the collaborators once; every domain loop shares them.
    let ip_source: Arc<dyn IpSource> = Arc::new(HttpIpSource::from_settings(&settings)?);
    let resolver: Arc<dyn DnsResolver> = Arc::new(TrustDnsResolver::new(
        settings.resolver.as_deref(),
        settings.ip_version,
        Duration::from_secs(settings.http_timeout_secs),
    )?);
    let http_factory: Arc<dyn HttpClientFactory> = Arc::new(DefaultClientFactory::new());
    let provider: Arc<dyn DnsProvider> = Arc::new(DinahostingProvider::from_settings(&settings));
    let notifier: Arc<dyn NotificationSink> = Arc::new(LogNotifier::new());

    info!("Provider: {}", provider.provider_name());

    let (mut supervisor, mut panic_rx) = Supervisor::new(settings.domains.len());

    let spawn_loop = |supervisor: &mut Supervisor, domain: Domain| -> Result<()> {
        let domain_loop = DomainLoop::new(
            domain,
            settings.clone(),
            ip_source.clone(),
            resolver.clone(),
            http_factory.clone(),
            provider.clone(),
            notifier.clone(),
        )?;
        supervisor.spawn(domain_loop, run_once);
        Ok(())
    };

    for domain in &settings.domains {
        info!(
            "Managing domain {} ({} subdomain(s))",
            domain.domain_name,
            domain.sub_domains.len()
        );
        spawn_loop(&mut supervisor, domain.clone())?;
    }

    if run_once {
        supervisor.join_all().await;
        while let Ok(signal) = panic_rx.try_recv() {
            warn!(
                "Domain loop for {} crashed: {}",
                signal.domain.domain_name, signal.reason
            );
        }
        info!("Single pass complete");
        return Ok(());
    }

    // Continuous mode: respawn crashed loops, stop on shutdown signal.
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(signal) = panic_rx.recv() => {
                error!(
                    "Domain loop for {} crashed: {}; restarting it",
                    signal.domain.domain_name, signal.reason
                );
                spawn_loop(&mut supervisor, signal.domain)?;
            }

            received = &mut shutdown => {
                info!("Received shutdown signal: {}", received?);
                break;
            }
        }
    }

    info!("Shutting down daemon");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn shutdown_signal() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}

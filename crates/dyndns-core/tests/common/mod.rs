//! Test doubles and common utilities for the loop contract tests
//!
//! The doubles count and record every collaborator call so the tests can
//! assert on exactly what a cycle did, without any real network I/O.

#![allow(dead_code)]

use async_trait::async_trait;
use dyndns_core::config::{Domain, IpVersion, Settings};
use dyndns_core::error::{Error, Result};
use dyndns_core::traits::{DnsProvider, DnsResolver, IpSource, NotificationSink};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Parse a literal IP address in a test
pub fn ip(s: &str) -> IpAddr {
    s.parse().expect("test IP literals are valid")
}

/// Minimal valid settings for driving a loop in tests
pub fn test_settings(interval_secs: u64) -> Settings {
    Settings {
        interval_secs,
        use_proxy: false,
        socks5_proxy: None,
        resolver: None,
        ip_version: IpVersion::V4,
        email: "agent@example.com".to_string(),
        password: "correct-horse".to_string(),
        user_agent: None,
        http_timeout_secs: 5,
        ip_urls: vec!["https://api.ipify.org".to_string()],
        domains: Vec::new(),
    }
}

/// An IpSource that always answers with the same address
pub struct StaticIpSource {
    current_ip: IpAddr,
    calls: AtomicUsize,
}

impl StaticIpSource {
    pub fn new(current_ip: IpAddr) -> Self {
        Self {
            current_ip,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times current() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<IpAddr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.current_ip)
    }
}

/// An IpSource whose discovery always fails
pub struct FailingIpSource {
    calls: AtomicUsize,
}

impl FailingIpSource {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IpSource for FailingIpSource {
    async fn current(&self) -> Result<IpAddr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::ip_discovery("injected discovery failure"))
    }
}

/// A DnsResolver answering from a fixed hostname map, with optional
/// injected failures per hostname
pub struct MapResolver {
    answers: HashMap<String, IpAddr>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self {
            answers: HashMap::new(),
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Configure the published IP for a hostname
    pub fn with_answer(mut self, hostname: &str, published_ip: &str) -> Self {
        self.answers.insert(hostname.to_string(), ip(published_ip));
        self
    }

    /// Make resolution of a hostname fail
    pub fn with_failure(mut self, hostname: &str) -> Self {
        self.failing.insert(hostname.to_string());
        self
    }

    /// Hostnames resolved so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl DnsResolver for MapResolver {
    async fn resolve(&self, hostname: &str) -> Result<IpAddr> {
        self.calls.lock().unwrap().push(hostname.to_string());

        if self.failing.contains(hostname) {
            return Err(Error::resolve(format!(
                "injected resolution failure for {}",
                hostname
            )));
        }

        self.answers.get(hostname).copied().ok_or_else(|| {
            Error::resolve(format!("no answer configured for {}", hostname))
        })
    }
}

/// What the mock provider does when called
pub enum ProviderBehavior {
    /// Acknowledge every update
    Succeed,
    /// Reject every update the way the real API rejects bad credentials
    Reject,
    /// Panic, simulating an unexpected runtime fault inside a cycle
    Panic,
}

/// A DnsProvider that records calls and follows a scripted behavior
pub struct MockProvider {
    behavior: ProviderBehavior,
    calls: Mutex<Vec<(String, String, IpAddr)>>,
}

impl MockProvider {
    pub fn succeeding() -> Self {
        Self::with_behavior(ProviderBehavior::Succeed)
    }

    pub fn rejecting() -> Self {
        Self::with_behavior(ProviderBehavior::Reject)
    }

    pub fn panicking() -> Self {
        Self::with_behavior(ProviderBehavior::Panic)
    }

    fn with_behavior(behavior: ProviderBehavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Recorded (domain, subdomain, ip) update calls, in order
    pub fn update_calls(&self) -> Vec<(String, String, IpAddr)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn update_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl DnsProvider for MockProvider {
    async fn update_record(
        &self,
        _client: &reqwest::Client,
        domain: &str,
        subdomain: &str,
        ip: IpAddr,
    ) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((domain.to_string(), subdomain.to_string(), ip));

        match self.behavior {
            ProviderBehavior::Succeed => Ok(()),
            ProviderBehavior::Reject => Err(Error::provider(
                "mock",
                r#"update rejected: status=200 OK, body={"responseCode":1001,"msg":"auth failed"}"#,
            )),
            ProviderBehavior::Panic => panic!("injected provider fault"),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A NotificationSink that records every notification
pub struct RecordingNotifier {
    notifications: Mutex<Vec<(String, IpAddr)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
        }
    }

    /// Recorded (hostname, ip) notifications, in order
    pub fn notifications(&self) -> Vec<(String, IpAddr)> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn notification_count(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn send(&self, hostname: &str, ip: IpAddr) {
        self.notifications
            .lock()
            .unwrap()
            .push((hostname.to_string(), ip));
    }
}

/// A domain with the scenario shape used across the contract tests
pub fn example_domain(sub_domains: &[&str]) -> Domain {
    Domain::new(
        "example.com",
        sub_domains.iter().map(|s| s.to_string()).collect(),
    )
}

//! Forward proxy reachability
//!
//! The probe is a plain TCP connect to the proxy's host and port. Its
//! outcome is cached until `reset` is called.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::Mutex;
use url::Url;

/// Result of the last proxy probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyStatus {
    /// No proxy configured; requests go direct
    NotConfigured,
    /// Configured but not probed yet
    Untested,
    /// TCP connect succeeded
    Reachable,
    /// TCP connect failed or timed out
    Unreachable,
    /// Address could not be parsed
    Invalid,
}

impl ProxyStatus {
    /// Whether requests can be expected to get through
    pub fn is_usable(self) -> bool {
        matches!(self, ProxyStatus::NotConfigured | ProxyStatus::Reachable)
    }
}

impl std::fmt::Display for ProxyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProxyStatus::NotConfigured => write!(f, "not configured"),
            ProxyStatus::Untested => write!(f, "untested"),
            ProxyStatus::Reachable => write!(f, "reachable"),
            ProxyStatus::Unreachable => write!(f, "unreachable"),
            ProxyStatus::Invalid => write!(f, "invalid address"),
        }
    }
}

/// Tests and caches whether the configured proxy accepts connections
#[derive(Debug)]
pub struct ProxyProber {
    address: Option<String>,
    timeout: Duration,
    status: Mutex<ProxyStatus>,
}

impl ProxyProber {
    pub fn new(address: Option<String>, timeout: Duration) -> Self {
        let address = address.filter(|a| !a.trim().is_empty());
        let status = if address.is_some() {
            ProxyStatus::Untested
        } else {
            ProxyStatus::NotConfigured
        };
        Self {
            address,
            timeout,
            status: Mutex::new(status),
        }
    }

    /// Configured proxy address
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Current cached status without probing
    pub async fn status(&self) -> ProxyStatus {
        *self.status.lock().await
    }

    /// Probe the proxy once and cache the outcome.
    ///
    /// Returns true when no proxy is configured. An address that cannot be
    /// parsed counts as tested and unreachable.
    pub async fn test(&self) -> bool {
        let Some(address) = self.address.as_deref() else {
            return true;
        };

        let mut status = self.status.lock().await;
        if *status != ProxyStatus::Untested {
            return *status == ProxyStatus::Reachable;
        }

        *status = match proxy_socket_addr(address) {
            Some(target) => {
                match tokio::time::timeout(self.timeout, TcpStream::connect(&target)).await {
                    Ok(Ok(_)) => {
                        tracing::debug!(proxy = %target, "Proxy reachable");
                        ProxyStatus::Reachable
                    }
                    Ok(Err(e)) => {
                        tracing::debug!(proxy = %target, error = %e, "Proxy unreachable");
                        ProxyStatus::Unreachable
                    }
                    Err(_) => {
                        tracing::debug!(
                            proxy = %target,
                            timeout_ms = self.timeout.as_millis(),
                            "Proxy probe timed out"
                        );
                        ProxyStatus::Unreachable
                    }
                }
            }
            None => {
                tracing::warn!(proxy = %address, "Invalid proxy address");
                ProxyStatus::Invalid
            }
        };

        *status == ProxyStatus::Reachable
    }

    /// Forget the cached outcome so the next `test` probes again
    pub async fn reset(&self) {
        let mut status = self.status.lock().await;
        if self.address.is_some() {
            *status = ProxyStatus::Untested;
        }
    }
}

/// `host:port` to connect to, defaulting the port from the scheme.
///
/// A bare `host:port` is read as an http proxy, matching how reqwest
/// routes traffic through it.
fn proxy_socket_addr(address: &str) -> Option<String> {
    let url = if address.contains("://") {
        Url::parse(address)
    } else {
        Url::parse(&format!("http://{address}"))
    }
    .ok()?;
    let host = url.host_str().filter(|h| !h.is_empty())?;
    let port = url
        .port()
        .unwrap_or(if url.scheme() == "https" { 443 } else { 80 });

    // IPv6 literals keep their brackets in host_str
    Some(format!("{host}:{port}"))
}

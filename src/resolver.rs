//! Hostname resolution behind a pluggable lookup trait.

use std::io;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use ipnet::IpNet;

#[cfg(test)]
use mockall::automock;

use crate::address::AddressSpec;

/// Default DNS resolution timeout in seconds
const DNS_TIMEOUT_SECS: u64 = 5;

/// Name-lookup collaborator.
///
/// The engine never talks to DNS directly; it consumes this trait so tests
/// can substitute a deterministic resolver.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Resolve a hostname to its addresses, both families.
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Production resolver backed by the system resolver (getaddrinfo).
///
/// The blocking lookup runs on the blocking pool and is capped by a
/// 5-second timeout; a timeout surfaces as an ordinary lookup error.
pub struct SystemResolver {
    timeout: Duration,
}

impl SystemResolver {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DNS_TIMEOUT_SECS),
        }
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostResolver for SystemResolver {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let name = host.to_string();
        let lookup = tokio::task::spawn_blocking(move || dns_lookup::lookup_host(&name));

        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(io::Error::new(io::ErrorKind::Other, join_err)),
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "DNS lookup timed out",
            )),
        }
    }
}

/// Resolve one spec into zero or more normalized networks.
///
/// A CIDR spec is pure: host bits are truncated and the single network
/// returned. A hostname spec delegates to `resolver`; every address becomes
/// a host network. An empty answer set is treated as a lookup failure.
pub async fn resolve_spec(
    spec: &AddressSpec,
    resolver: &dyn HostResolver,
) -> io::Result<Vec<IpNet>> {
    match spec {
        AddressSpec::Cidr(net) => Ok(vec![net.trunc()]),
        AddressSpec::Hostname(host) => {
            let addrs = resolver.lookup(host).await?;
            if addrs.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "no addresses returned",
                ));
            }
            Ok(addrs.into_iter().map(IpNet::from).collect())
        }
    }
}

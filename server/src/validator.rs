use std::{io, net::IpAddr, sync::Arc, time::Duration};

use async_trait::async_trait;
use url::{Host, Url};

use crate::{error::AppError, models::Hostname};

/// Name-resolution backend used to decide whether a hostname is real.
#[async_trait]
pub trait HostResolver: Send + Sync + 'static {
    /// Resolve `host` to its addresses. An empty list counts as a miss.
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Resolves through the operating system's resolver (`getaddrinfo`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Accepts a candidate URL only if it has a hostname that resolves.
#[derive(Clone)]
pub struct UrlValidator {
    resolver: Arc<dyn HostResolver>,
    lookup_timeout: Duration,
}

impl UrlValidator {
    pub fn new(resolver: Arc<dyn HostResolver>, lookup_timeout: Duration) -> Self {
        Self {
            resolver,
            lookup_timeout,
        }
    }

    /// Validate `candidate` and return the hostname that was checked.
    ///
    /// Every failure (unparseable input, no host, lookup error, timeout, no
    /// addresses) collapses into [`AppError::InvalidUrl`]. The lookup is the
    /// only await point; dropping the returned future abandons it.
    pub async fn validate(&self, candidate: &str) -> Result<Hostname, AppError> {
        let url = Url::parse(candidate).map_err(|e| {
            tracing::debug!(candidate, error = %e, "url did not parse");
            AppError::InvalidUrl
        })?;

        let domain = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain,
            // An address literal resolves to itself.
            Some(Host::Ipv4(_) | Host::Ipv6(_)) => {
                let literal = url.host_str().unwrap_or_default();
                return Ok(Hostname::new(literal));
            }
            _ => {
                tracing::debug!(candidate, "url has no hostname");
                return Err(AppError::InvalidUrl);
            }
        };

        match tokio::time::timeout(self.lookup_timeout, self.resolver.lookup(domain)).await {
            Ok(Ok(addrs)) if !addrs.is_empty() => Ok(Hostname::new(domain)),
            Ok(Ok(_)) => {
                tracing::debug!(domain, "lookup returned no addresses");
                Err(AppError::InvalidUrl)
            }
            Ok(Err(e)) => {
                tracing::debug!(domain, error = %e, "lookup failed");
                Err(AppError::InvalidUrl)
            }
            Err(_) => {
                tracing::debug!(domain, timeout = ?self.lookup_timeout, "lookup timed out");
                Err(AppError::InvalidUrl)
            }
        }
    }
}

/// Deterministic resolvers for tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::{
        collections::HashSet,
        net::Ipv4Addr,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    /// Knows a fixed set of hostnames; everything else is NXDOMAIN.
    #[derive(Debug, Default)]
    pub struct StaticResolver {
        known: HashSet<String>,
        calls: AtomicUsize,
    }

    impl StaticResolver {
        pub fn with_hosts(hosts: &[&str]) -> Self {
            Self {
                known: hosts.iter().map(|h| h.to_string()).collect(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HostResolver for StaticResolver {
        async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.known.contains(host) {
                Ok(vec![IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34))])
            } else {
                Err(io::Error::new(io::ErrorKind::NotFound, "no such host"))
            }
        }
    }

    /// Answers every lookup with an empty address list.
    pub struct EmptyResolver;

    #[async_trait]
    impl HostResolver for EmptyResolver {
        async fn lookup(&self, _host: &str) -> io::Result<Vec<IpAddr>> {
            Ok(Vec::new())
        }
    }

    /// Never answers.
    pub struct HangingResolver;

    #[async_trait]
    impl HostResolver for HangingResolver {
        async fn lookup(&self, _host: &str) -> io::Result<Vec<IpAddr>> {
            std::future::pending().await
        }
    }
}

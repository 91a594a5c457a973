//! Resolver configuration types.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use smp_locate_core::{LocateError, Result};

/// Standard DNS port, used when a server is given without one
pub const DNS_PORT: u16 = 53;

/// Bounds for a single NAPTR lookup.
///
/// A lookup is resubmitted while the server signals a transient failure,
/// at most `max_try_again` extra times. Every server gets `query_timeout`
/// to answer before the next one in the list is asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Upper bound for one DNS round trip
    pub query_timeout: Duration,

    /// Resubmissions after a transient failure
    pub max_try_again: u32,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverSettings {
    /// Create the default settings: 5 seconds per query, 3 resubmissions
    #[must_use]
    pub const fn new() -> Self {
        Self {
            query_timeout: Duration::from_secs(5),
            max_try_again: 3,
        }
    }

    /// Set the per query timeout
    #[must_use]
    pub const fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Set the number of resubmissions after a transient failure
    #[must_use]
    pub const fn max_try_again(mut self, max: u32) -> Self {
        self.max_try_again = max;
        self
    }

    /// Total number of attempts a lookup may take
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_try_again.saturating_add(1)
    }

    /// Upper bound for one attempt against `server_count` servers.
    ///
    /// Servers are asked one after the other, each given `query_timeout`,
    /// so the last one in the list must still get its turn. An empty list
    /// (system resolver) counts as one server.
    #[must_use]
    pub fn attempt_budget(&self, server_count: usize) -> Duration {
        let rounds = u32::try_from(server_count.max(1)).unwrap_or(u32::MAX);
        self.query_timeout.saturating_mul(rounds)
    }
}

/// Parse a DNS server given as `ip`, `ip:port` or `[ipv6]:port`.
pub fn parse_dns_server(server: &str) -> Result<SocketAddr> {
    let server = server.trim();
    if let Ok(addr) = server.parse::<SocketAddr>() {
        return Ok(addr);
    }
    server
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DNS_PORT))
        .map_err(|_| LocateError::invalid_input(format!("invalid DNS server address '{server}'")))
}

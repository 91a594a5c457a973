//! Raw NAPTR queries.
//!
//! [`NaptrLookup`] is the seam between the resolution algorithm and the
//! network. [`HickoryNaptrLookup`] talks to real DNS servers,
//! [`StaticNaptrLookup`] answers from memory and counts queries.

use async_trait::async_trait;
use hickory_resolver::config::{
    NameServerConfigGroup, ResolverConfig, ResolverOpts, ServerOrderingStrategy,
};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::proto::ProtoErrorKind;
use hickory_resolver::{ResolveError, ResolveErrorKind, Resolver, TokioResolver};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::record::NaptrRecord;

/// Outcome of a single NAPTR query that did not produce an answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// Transient condition, the same query may succeed when resubmitted
    #[error("temporary failure: {0}")]
    TryAgain(String),

    /// NXDOMAIN
    #[error("host not found")]
    HostNotFound,

    /// Anything that resubmitting will not fix
    #[error("unrecoverable lookup failure: {0}")]
    Unrecoverable(String),
}

impl LookupFailure {
    /// Returns true if the query should be resubmitted
    #[must_use]
    pub const fn is_try_again(&self) -> bool {
        matches!(self, Self::TryAgain(_))
    }
}

/// Performs one NAPTR query.
///
/// An existing name without NAPTR records is an empty answer, not a failure.
#[async_trait]
pub trait NaptrLookup: Send + Sync {
    /// Query NAPTR records of `domain`, asking `servers` in order, or the
    /// system resolver when `servers` is empty.
    async fn lookup_naptr(
        &self,
        domain: &str,
        servers: &[SocketAddr],
    ) -> Result<Vec<NaptrRecord>, LookupFailure>;
}

/// NAPTR queries through hickory-resolver.
#[derive(Debug, Clone)]
pub struct HickoryNaptrLookup {
    timeout: Duration,
}

impl Default for HickoryNaptrLookup {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl HickoryNaptrLookup {
    /// Create a lookup whose resolver gives up on a server after `timeout`
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn options(&self) -> ResolverOpts {
        let mut opts = ResolverOpts::default();
        opts.timeout = self.timeout;
        opts.attempts = 1;
        opts.num_concurrent_reqs = 1;
        opts.cache_size = 0;
        opts.server_ordering_strategy = ServerOrderingStrategy::UserProvidedOrder;
        opts
    }

    fn create_resolver(&self, servers: &[SocketAddr]) -> Result<TokioResolver, LookupFailure> {
        if servers.is_empty() {
            let builder = TokioResolver::builder_tokio().map_err(|e| {
                LookupFailure::Unrecoverable(format!("failed to create system resolver: {e}"))
            })?;
            return Ok(builder.with_options(self.options()).build());
        }

        let mut group = NameServerConfigGroup::with_capacity(servers.len() * 2);
        for server in servers {
            group.merge(NameServerConfigGroup::from_ips_clear(
                &[server.ip()],
                server.port(),
                true,
            ));
        }
        let config = ResolverConfig::from_parts(None, vec![], group);
        Ok(
            Resolver::builder_with_config(config, TokioConnectionProvider::default())
                .with_options(self.options())
                .build(),
        )
    }
}

#[async_trait]
impl NaptrLookup for HickoryNaptrLookup {
    async fn lookup_naptr(
        &self,
        domain: &str,
        servers: &[SocketAddr],
    ) -> Result<Vec<NaptrRecord>, LookupFailure> {
        let resolver = self.create_resolver(servers)?;
        debug!(name = domain, servers = servers.len(), "querying NAPTR records");

        match resolver.lookup(domain, RecordType::NAPTR).await {
            Ok(lookup) => Ok(lookup.iter().filter_map(naptr_from_rdata).collect()),
            Err(e) => classify(domain, &e),
        }
    }
}

fn naptr_from_rdata(rdata: &RData) -> Option<NaptrRecord> {
    match rdata {
        RData::NAPTR(naptr) => Some(NaptrRecord {
            order: naptr.order(),
            preference: naptr.preference(),
            flags: String::from_utf8_lossy(naptr.flags()).into_owned(),
            service: String::from_utf8_lossy(naptr.services()).into_owned(),
            regexp: String::from_utf8_lossy(naptr.regexp()).into_owned(),
            replacement: naptr.replacement().to_string(),
        }),
        _ => None,
    }
}

fn classify(domain: &str, err: &ResolveError) -> Result<Vec<NaptrRecord>, LookupFailure> {
    let ResolveErrorKind::Proto(proto) = err.kind() else {
        return Err(LookupFailure::Unrecoverable(err.to_string()));
    };

    match proto.kind() {
        ProtoErrorKind::NoRecordsFound { response_code, .. } => {
            classify_response_code(domain, *response_code)
        }
        ProtoErrorKind::Timeout | ProtoErrorKind::Busy => {
            Err(LookupFailure::TryAgain(proto.to_string()))
        }
        _ => Err(LookupFailure::Unrecoverable(proto.to_string())),
    }
}

/// Map the RCODE of an answer without NAPTR records.
fn classify_response_code(
    domain: &str,
    code: ResponseCode,
) -> Result<Vec<NaptrRecord>, LookupFailure> {
    match code {
        ResponseCode::NoError => {
            debug!(name = domain, "name exists without NAPTR records");
            Ok(Vec::new())
        }
        ResponseCode::NXDomain => {
            debug!(name = domain, "NXDOMAIN");
            Err(LookupFailure::HostNotFound)
        }
        ResponseCode::ServFail => Err(LookupFailure::TryAgain(format!("server answered {code}"))),
        other => Err(LookupFailure::Unrecoverable(format!("server answered {other}"))),
    }
}

/// In-memory NAPTR answers, for tests and offline setups.
///
/// Unknown names answer with [`LookupFailure::HostNotFound`]. Every call is
/// counted, so callers can check that a cache prevented a query.
#[derive(Debug, Default)]
pub struct StaticNaptrLookup {
    zones: RwLock<HashMap<String, Result<Vec<NaptrRecord>, LookupFailure>>>,
    queries: AtomicUsize,
    servers_seen: RwLock<Vec<Vec<SocketAddr>>>,
}

impl StaticNaptrLookup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `domain` with `records`
    #[must_use]
    pub fn with_records(self, domain: impl Into<String>, records: Vec<NaptrRecord>) -> Self {
        self.zones.write().insert(domain.into(), Ok(records));
        self
    }

    /// Answer `domain` with `failure`
    #[must_use]
    pub fn with_failure(self, domain: impl Into<String>, failure: LookupFailure) -> Self {
        self.zones.write().insert(domain.into(), Err(failure));
        self
    }

    /// Number of queries answered so far
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Server lists passed to each query, in call order
    #[must_use]
    pub fn servers_seen(&self) -> Vec<Vec<SocketAddr>> {
        self.servers_seen.read().clone()
    }
}

#[async_trait]
impl NaptrLookup for StaticNaptrLookup {
    async fn lookup_naptr(
        &self,
        domain: &str,
        servers: &[SocketAddr],
    ) -> Result<Vec<NaptrRecord>, LookupFailure> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.servers_seen.write().push(servers.to_vec());
        self.zones
            .read()
            .get(domain)
            .cloned()
            .unwrap_or(Err(LookupFailure::HostNotFound))
    }
}

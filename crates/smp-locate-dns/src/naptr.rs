//! U-NAPTR resolution of synthetic participant names (RFC 2915).
//!
//! ```text
//! query NAPTR(domain)         -- resubmitted while the server says "try again"
//!   -> keep flags == "U" && service == <service>
//!   -> stable sort by (order, preference)
//!   -> first record whose substitution expression rewrites `domain`
//!      into a parseable URL wins
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use smp_locate_core::{DnsErrorKind, DnsResolutionError};
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

use crate::config::ResolverSettings;
use crate::lookup::{LookupFailure, NaptrLookup};
use crate::record::{select_candidates, NaptrRecord};
use crate::rewrite::{SubstitutionExpr, MIN_REGEXP_LEN};

/// Resolves a domain name to a URL through terminal NAPTR records.
#[derive(Clone)]
pub struct NaptrResolver {
    lookup: Arc<dyn NaptrLookup>,
    settings: ResolverSettings,
}

impl std::fmt::Debug for NaptrResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NaptrResolver")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl NaptrResolver {
    /// Create a resolver on top of `lookup`
    pub fn new(lookup: Arc<dyn NaptrLookup>, settings: ResolverSettings) -> Self {
        Self { lookup, settings }
    }

    #[must_use]
    pub const fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolve `domain` for `service` to the URL of the first usable
    /// terminal record.
    pub async fn resolve(
        &self,
        domain: &str,
        service: &str,
        servers: &[SocketAddr],
    ) -> Result<String, DnsResolutionError> {
        let records = self.query(domain, servers).await?;

        let candidates = select_candidates(&records, service);
        if candidates.is_empty() {
            warn!(name = domain, service, "no matching DNS NAPTR records returned");
            return Err(DnsResolutionError::new(
                domain,
                DnsErrorKind::NoMatchingRecord,
                format!("no matching NAPTR records for service '{service}'"),
            ));
        }

        if let Some(url) = rewrite_first(&candidates, domain) {
            debug!(name = domain, url = %url, "resolved via NAPTR");
            return Ok(url);
        }

        let details = candidates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        warn!(
            name = domain,
            records = %details,
            "none of the matching DNS NAPTR records has a valid regular expression"
        );
        Err(DnsResolutionError::new(
            domain,
            DnsErrorKind::Rewrite,
            format!("no candidate had a valid regular expression: {details}"),
        ))
    }

    /// Run the query, resubmitting on transient failures within budget.
    async fn query(
        &self,
        domain: &str,
        servers: &[SocketAddr],
    ) -> Result<Vec<NaptrRecord>, DnsResolutionError> {
        let attempts = self.settings.max_attempts();
        let budget = self.settings.attempt_budget(servers.len());
        let mut last = LookupFailure::TryAgain(String::from("no attempt made"));

        for attempt in 1..=attempts {
            let outcome = timeout(budget, self.lookup.lookup_naptr(domain, servers))
                .await
                .unwrap_or_else(|_| {
                    Err(LookupFailure::TryAgain(format!("no answer within {budget:?}")))
                });

            match outcome {
                Ok(records) => return Ok(records),
                Err(failure) if failure.is_try_again() => {
                    debug!(name = domain, attempt, attempts, error = %failure, "NAPTR lookup will be retried");
                    last = failure;
                }
                Err(failure) => {
                    warn!(name = domain, error = %failure, "error looking up NAPTR records");
                    return Err(transport_error(domain, failure));
                }
            }
        }

        warn!(name = domain, attempts, error = %last, "NAPTR lookup gave up");
        Err(transport_error(domain, last))
    }
}

fn transport_error(domain: &str, failure: LookupFailure) -> DnsResolutionError {
    DnsResolutionError::new(domain, DnsErrorKind::Transport, failure.to_string()).with_source(failure)
}

/// Apply the candidates' substitution expressions in order and return the
/// first result that is a URL.
fn rewrite_first(candidates: &[NaptrRecord], domain: &str) -> Option<String> {
    candidates.iter().find_map(|record| {
        if record.regexp.len() < MIN_REGEXP_LEN {
            return None;
        }
        let expr = match SubstitutionExpr::parse(&record.regexp) {
            Ok(expr) => expr,
            Err(e) => {
                debug!(record = %record, error = %e, "skipping NAPTR record");
                return None;
            }
        };
        debug!(
            pattern = expr.pattern,
            replacement = expr.replacement,
            flags = expr.flags,
            "NAPTR regex"
        );

        match expr.apply(domain) {
            Ok(rewritten) if Url::parse(&rewritten).is_ok() => {
                debug!(name = domain, rewritten = %rewritten, "NAPTR replacement");
                Some(rewritten)
            }
            Ok(rewritten) => {
                debug!(rewritten = %rewritten, "NAPTR replacement is not a URL");
                None
            }
            Err(e) => {
                debug!(record = %record, error = %e, "NAPTR replacement failed");
                None
            }
        }
    })
}

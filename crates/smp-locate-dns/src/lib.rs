//! DNS side of SMP location.
//!
//! ## Data Flow
//!
//! ```text
//! participant value
//!   -> hash::encode_participant_value()     SHA-256 + Base32 label
//!   -> hash::build_dns_name()               label[.scheme].zone
//!   -> DnsCache::get()                      optional lookaside
//!   -> NaptrResolver::resolve()             NAPTR query + U-rule rewrite
//!   -> SMP URL
//! ```
//!
//! The network is reached only through the [`NaptrLookup`] trait, so tests
//! and offline setups can plug in [`StaticNaptrLookup`].

pub mod cache;
pub mod config;
pub mod hash;
pub mod lookup;
pub mod naptr;
pub mod record;
pub mod rewrite;

pub use cache::DnsCache;
pub use config::{parse_dns_server, ResolverSettings, DNS_PORT};
pub use hash::{build_dns_name, encode_participant_value};
pub use lookup::{HickoryNaptrLookup, LookupFailure, NaptrLookup, StaticNaptrLookup};
pub use naptr::NaptrResolver;
pub use record::{select_candidates, NaptrRecord};
pub use rewrite::{apply_substitution, RewriteError, SubstitutionExpr};

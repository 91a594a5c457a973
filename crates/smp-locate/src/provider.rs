//! The URL provider: participant identifier + SML zone -> SMP location.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use smp_locate_core::{DnsZone, LocateError, ParticipantIdentifier, Result};
use smp_locate_dns::{
    build_dns_name, encode_participant_value, parse_dns_server, DnsCache, HickoryNaptrLookup,
    NaptrLookup, NaptrResolver, ResolverSettings,
};

/// U-NAPTR service name used by e-SENS and OASIS BDXL 1.0
pub const NAPTR_SERVICE_META_SMP: &str = "Meta:SMP";

/// U-NAPTR service name used by OASIS SMP 2.0 in the BPC network
pub const NAPTR_SERVICE_BDXR_SMP2: &str = "oasis-bdxr-smp-2";

/// Named provider configurations for the known networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Hash naming only, SMP host name derived directly from the identifier
    Peppol,
    /// NAPTR indirection with service `Meta:SMP`, scheme part of the name
    #[default]
    Esens,
    /// OASIS BDXL 1.0, same layout as e-SENS
    Bdxl,
    /// NAPTR indirection with service `oasis-bdxr-smp-2`, no scheme in the name
    BpcSmp2,
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Peppol => write!(f, "peppol"),
            Self::Esens => write!(f, "esens"),
            Self::Bdxl => write!(f, "bdxl"),
            Self::BpcSmp2 => write!(f, "bpc-smp2"),
        }
    }
}

/// Per call knobs for [`UrlProvider::resolve_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Query NAPTR records; when false the synthetic name is returned as is
    pub do_naptr_resolving: bool,

    /// DNS server asked before the provider's custom servers
    pub primary_dns_server: Option<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolveOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            do_naptr_resolving: true,
            primary_dns_server: None,
        }
    }

    /// Options that never touch the network
    #[must_use]
    pub fn without_naptr() -> Self {
        Self::new().naptr_resolving(false)
    }

    #[must_use]
    pub fn naptr_resolving(mut self, enabled: bool) -> Self {
        self.do_naptr_resolving = enabled;
        self
    }

    #[must_use]
    pub fn primary_dns_server(mut self, server: impl Into<String>) -> Self {
        self.primary_dns_server = Some(server.into());
        self
    }
}

/// Resolves participants to the DNS name or URL of their SMP.
///
/// All settings are fixed once the provider is shared; the DNS cache is the
/// only mutable state and is safe for concurrent use. Cache contents belong
/// to this instance alone.
pub struct UrlProvider {
    naptr_service_name: Option<String>,
    lowercase_value_before_hashing: bool,
    add_identifier_scheme_to_zone: bool,
    use_dns_cache: bool,
    label_prefix: String,
    custom_dns_servers: Vec<SocketAddr>,
    resolver_settings: ResolverSettings,
    lookup: Option<Arc<dyn NaptrLookup>>,
    cache: DnsCache,
}

impl fmt::Debug for UrlProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlProvider")
            .field("naptr_service_name", &self.naptr_service_name)
            .field("lowercase_value_before_hashing", &self.lowercase_value_before_hashing)
            .field("add_identifier_scheme_to_zone", &self.add_identifier_scheme_to_zone)
            .field("use_dns_cache", &self.use_dns_cache)
            .field("label_prefix", &self.label_prefix)
            .field("custom_dns_servers", &self.custom_dns_servers)
            .field("resolver_settings", &self.resolver_settings)
            .field("cached_entries", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl Default for UrlProvider {
    fn default() -> Self {
        Self::esens()
    }
}

impl UrlProvider {
    /// Create a provider. `None` as service name gives a pure hash naming
    /// provider that never queries DNS.
    #[must_use]
    pub fn new(naptr_service_name: Option<&str>) -> Self {
        Self {
            naptr_service_name: naptr_service_name.map(str::to_string),
            lowercase_value_before_hashing: true,
            add_identifier_scheme_to_zone: true,
            use_dns_cache: true,
            label_prefix: String::new(),
            custom_dns_servers: Vec::new(),
            resolver_settings: ResolverSettings::default(),
            lookup: None,
            cache: DnsCache::new(),
        }
    }

    /// Provider for a named network configuration
    #[must_use]
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Peppol => Self::peppol(),
            Preset::Esens => Self::esens(),
            Preset::Bdxl => Self::bdxl(),
            Preset::BpcSmp2 => Self::bpc_smp2(),
        }
    }

    /// Hash naming: `BASE32(SHA256(lower(value))).scheme.zone`, no DNS
    #[must_use]
    pub fn peppol() -> Self {
        Self::new(None)
    }

    /// e-SENS: hash naming plus `Meta:SMP` U-NAPTR lookup, cached
    #[must_use]
    pub fn esens() -> Self {
        Self::new(Some(NAPTR_SERVICE_META_SMP))
    }

    /// OASIS BDXL 1.0, identical layout to [`UrlProvider::esens`]
    #[must_use]
    pub fn bdxl() -> Self {
        Self::esens()
    }

    /// BPC network with OASIS SMP 2.0: scheme not part of the name, no cache
    #[must_use]
    pub fn bpc_smp2() -> Self {
        Self::new(Some(NAPTR_SERVICE_BDXR_SMP2))
            .add_identifier_scheme_to_zone(false)
            .use_dns_cache(false)
    }

    /// Lower-case the identifier value before hashing
    #[must_use]
    pub fn lowercase_value_before_hashing(mut self, enabled: bool) -> Self {
        self.lowercase_value_before_hashing = enabled;
        self
    }

    /// Put the identifier scheme between hash label and zone
    #[must_use]
    pub fn add_identifier_scheme_to_zone(mut self, enabled: bool) -> Self {
        self.add_identifier_scheme_to_zone = enabled;
        self
    }

    /// Cache successful NAPTR resolutions
    #[must_use]
    pub fn use_dns_cache(mut self, enabled: bool) -> Self {
        self.use_dns_cache = enabled;
        self
    }

    /// Replace the U-NAPTR service name; `None` disables NAPTR resolution
    #[must_use]
    pub fn naptr_service_name(mut self, service: Option<&str>) -> Self {
        self.naptr_service_name = service.map(str::to_string);
        self
    }

    /// Literal put in front of the hash label
    #[must_use]
    pub fn label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.label_prefix = prefix.into();
        self
    }

    /// DNS servers to query, in preference order
    #[must_use]
    pub fn custom_dns_servers(mut self, servers: Vec<SocketAddr>) -> Self {
        self.custom_dns_servers = servers;
        self
    }

    /// Append one DNS server given as `ip` or `ip:port`
    pub fn add_custom_dns_server(mut self, server: &str) -> Result<Self> {
        self.custom_dns_servers.push(parse_dns_server(server)?);
        Ok(self)
    }

    #[must_use]
    pub fn resolver_settings(mut self, settings: ResolverSettings) -> Self {
        self.resolver_settings = settings;
        self
    }

    /// Route NAPTR queries through `lookup` instead of the network
    #[must_use]
    pub fn with_lookup(mut self, lookup: Arc<dyn NaptrLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    #[must_use]
    pub const fn is_lowercase_value_before_hashing(&self) -> bool {
        self.lowercase_value_before_hashing
    }

    #[must_use]
    pub const fn is_add_identifier_scheme_to_zone(&self) -> bool {
        self.add_identifier_scheme_to_zone
    }

    #[must_use]
    pub const fn is_use_dns_cache(&self) -> bool {
        self.use_dns_cache
    }

    #[must_use]
    pub fn get_naptr_service_name(&self) -> Option<&str> {
        self.naptr_service_name.as_deref()
    }

    #[must_use]
    pub fn get_label_prefix(&self) -> &str {
        &self.label_prefix
    }

    #[must_use]
    pub fn get_custom_dns_servers(&self) -> &[SocketAddr] {
        &self.custom_dns_servers
    }

    #[must_use]
    pub const fn get_resolver_settings(&self) -> &ResolverSettings {
        &self.resolver_settings
    }

    /// Copy of all cached resolutions
    #[must_use]
    pub fn all_dns_cache_entries(&self) -> HashMap<String, String> {
        self.cache.get_all()
    }

    pub fn clear_dns_cache(&self) {
        self.cache.clear();
    }

    /// The synthetic DNS name of a participant in `zone`, without trailing
    /// dot. Pure computation, never touches the network.
    pub fn dns_name_of_participant<Z: DnsZone + ?Sized>(
        &self,
        participant: &ParticipantIdentifier,
        zone: &Z,
    ) -> Result<String> {
        let zone = zone.zone_name().trim();
        if zone.is_empty() || zone == "." {
            return Err(LocateError::invalid_input("SML zone name may not be empty"));
        }

        let label = encode_participant_value(
            participant.value(),
            self.lowercase_value_before_hashing,
        );
        let scheme = (self.add_identifier_scheme_to_zone && participant.has_scheme())
            .then(|| participant.scheme());
        let name = build_dns_name(&self.label_prefix, &label, scheme, zone);

        check_host_name(&name)?;

        debug!(participant = %participant, name = %name, "built participant DNS name");
        Ok(name)
    }

    /// Resolve with NAPTR lookup enabled and no primary DNS server.
    pub async fn resolve<Z: DnsZone + ?Sized>(
        &self,
        participant: &ParticipantIdentifier,
        zone: &Z,
    ) -> Result<String> {
        self.resolve_with(participant, zone, &ResolveOptions::new())
            .await
    }

    /// Resolve a participant to its SMP.
    ///
    /// Hash naming providers, or `do_naptr_resolving == false`, return the
    /// synthetic DNS name. Otherwise the NAPTR answer for that name is
    /// rewritten into the SMP URL, consulting the cache first when enabled.
    pub async fn resolve_with<Z: DnsZone + ?Sized>(
        &self,
        participant: &ParticipantIdentifier,
        zone: &Z,
        options: &ResolveOptions,
    ) -> Result<String> {
        let name = self.dns_name_of_participant(participant, zone)?;

        let Some(service) = self.naptr_target(options) else {
            return Ok(name);
        };

        let primary = options
            .primary_dns_server
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let servers = self.dns_servers(primary)?;

        let cache_key = DnsCache::key(&name, service, primary);
        if self.use_dns_cache {
            if let Some(hit) = self.cache.get(&cache_key) {
                return Ok(hit);
            }
        }

        let resolved = self.resolver().resolve(&name, service, &servers).await?;

        if self.use_dns_cache {
            self.cache.put(cache_key, resolved.clone());
        }
        Ok(resolved)
    }

    /// Blocking variant of [`UrlProvider::resolve_with`].
    ///
    /// Runs on a private current-thread runtime. When a DNS query is needed
    /// and the caller is already inside a tokio runtime this fails with
    /// [`LocateError::Runtime`]; use [`UrlProvider::resolve_with`] there.
    pub fn resolve_blocking<Z: DnsZone + ?Sized>(
        &self,
        participant: &ParticipantIdentifier,
        zone: &Z,
        options: &ResolveOptions,
    ) -> Result<String> {
        if self.naptr_target(options).is_none() {
            return self.dns_name_of_participant(participant, zone);
        }
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(LocateError::Runtime(String::from(
                "blocking resolution called from within an async runtime",
            )));
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.resolve_with(participant, zone, options))
    }

    /// The base URL of the participant's SMP.
    ///
    /// The result always has a scheme (`http://` is added to bare host
    /// names) and never ends with a slash.
    pub async fn smp_url_of_participant<Z: DnsZone + ?Sized>(
        &self,
        participant: &ParticipantIdentifier,
        zone: &Z,
    ) -> Result<String> {
        let resolved = self.resolve(participant, zone).await?;
        smp_base_url(&resolved)
    }

    /// Blocking variant of [`UrlProvider::smp_url_of_participant`].
    pub fn smp_url_of_participant_blocking<Z: DnsZone + ?Sized>(
        &self,
        participant: &ParticipantIdentifier,
        zone: &Z,
    ) -> Result<String> {
        let resolved = self.resolve_blocking(participant, zone, &ResolveOptions::new())?;
        smp_base_url(&resolved)
    }

    fn naptr_target(&self, options: &ResolveOptions) -> Option<&str> {
        if options.do_naptr_resolving {
            self.naptr_service_name.as_deref()
        } else {
            None
        }
    }

    fn dns_servers(&self, primary: Option<&str>) -> Result<Vec<SocketAddr>> {
        let mut servers = Vec::with_capacity(self.custom_dns_servers.len() + 1);
        if let Some(primary) = primary {
            servers.push(parse_dns_server(primary)?);
        }
        for server in &self.custom_dns_servers {
            if !servers.contains(server) {
                servers.push(*server);
            }
        }
        Ok(servers)
    }

    fn resolver(&self) -> NaptrResolver {
        let lookup = self.lookup.clone().unwrap_or_else(|| {
            Arc::new(HickoryNaptrLookup::new(self.resolver_settings.query_timeout))
        });
        NaptrResolver::new(lookup, self.resolver_settings.clone())
    }
}

/// `name` must make up the whole host of `http://<name>`; characters such
/// as `/`, `?`, `#` or `@` would otherwise cut it short.
fn check_host_name(name: &str) -> Result<()> {
    let as_url = format!("http://{name}");
    let url = Url::parse(&as_url).map_err(|e| LocateError::malformed_url(&as_url, e))?;
    match url.host_str() {
        Some(host) if host.eq_ignore_ascii_case(name) => Ok(()),
        Some(host) => Err(LocateError::malformed_url(
            as_url.as_str(),
            format!("host would be '{host}'"),
        )),
        None => Err(LocateError::malformed_url(as_url.as_str(), "no host")),
    }
}

/// Turn a resolved host name or URL into an SMP base URL string.
pub fn smp_base_url(resolved: &str) -> Result<String> {
    let raw = if resolved.contains("://") {
        resolved.to_string()
    } else {
        format!("http://{resolved}")
    };
    let base = raw.strip_suffix('/').unwrap_or(&raw);

    let url = Url::parse(base).map_err(|e| LocateError::malformed_url(base, e))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(LocateError::malformed_url(base, "no host"));
    }
    Ok(base.to_string())
}

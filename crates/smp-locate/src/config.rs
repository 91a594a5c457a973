//! Provider configuration loaded from TOML.
//!
//! ```toml
//! preset = "bpc-smp2"
//! use_dns_cache = true
//! custom_dns_servers = ["192.0.2.53", "192.0.2.54:5353"]
//!
//! [resolver]
//! query_timeout_ms = 2000
//! max_try_again = 1
//! ```
//!
//! Flags left out of the file keep the value of the chosen preset.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use smp_locate_core::{LocateError, Result, Sml, SmlInfo};
use smp_locate_dns::{parse_dns_server, ResolverSettings};

use crate::provider::{Preset, UrlProvider};

/// Configuration for a [`UrlProvider`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base configuration (default: esens).
    #[serde(default)]
    pub preset: Preset,

    /// Override of the preset's lower-casing flag.
    #[serde(default)]
    pub lowercase_value_before_hashing: Option<bool>,

    /// Override of the preset's scheme-in-zone flag.
    #[serde(default)]
    pub add_identifier_scheme_to_zone: Option<bool>,

    /// Override of the preset's cache flag.
    #[serde(default)]
    pub use_dns_cache: Option<bool>,

    /// DNS servers as `ip` or `ip:port`, in preference order.
    #[serde(default)]
    pub custom_dns_servers: Vec<String>,

    /// Literal put in front of the hash label.
    #[serde(default)]
    pub label_prefix: String,

    /// Id of a predefined SML (`digitprod`, `digittest`, `local`).
    #[serde(default)]
    pub sml: Option<String>,

    /// NAPTR lookup bounds.
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// The `[resolver]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Upper bound for one DNS round trip (default: 5000).
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Resubmissions after a transient failure (default: 3).
    #[serde(default = "default_max_try_again")]
    pub max_try_again: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: default_query_timeout_ms(),
            max_try_again: default_max_try_again(),
        }
    }
}

impl From<&ResolverConfig> for ResolverSettings {
    fn from(config: &ResolverConfig) -> Self {
        Self::new()
            .query_timeout(Duration::from_millis(config.query_timeout_ms))
            .max_try_again(config.max_try_again)
    }
}

impl ProviderConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config = Self::from_toml(&content)?;
            debug!(path = %path.display(), preset = %config.preset, "loaded provider config");
            Ok(config)
        } else {
            debug!(path = %path.display(), "no provider config, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| LocateError::Config(e.to_string()))
    }

    /// The configured predefined SML, if any.
    pub fn sml_info(&self) -> Result<Option<SmlInfo>> {
        self.sml
            .as_deref()
            .map(|id| {
                Sml::from_id(id)
                    .map(Sml::info)
                    .ok_or_else(|| LocateError::Config(format!("unknown SML id '{id}'")))
            })
            .transpose()
    }

    /// Build the provider. Fails on unparsable DNS server addresses.
    pub fn into_provider(self) -> Result<UrlProvider> {
        let mut provider = UrlProvider::from_preset(self.preset)
            .label_prefix(self.label_prefix)
            .resolver_settings(ResolverSettings::from(&self.resolver));

        if let Some(enabled) = self.lowercase_value_before_hashing {
            provider = provider.lowercase_value_before_hashing(enabled);
        }
        if let Some(enabled) = self.add_identifier_scheme_to_zone {
            provider = provider.add_identifier_scheme_to_zone(enabled);
        }
        if let Some(enabled) = self.use_dns_cache {
            provider = provider.use_dns_cache(enabled);
        }

        let servers = self
            .custom_dns_servers
            .iter()
            .map(|s| parse_dns_server(s))
            .collect::<Result<Vec<_>>>()?;
        Ok(provider.custom_dns_servers(servers))
    }
}

// Default value functions for serde.
const fn default_query_timeout_ms() -> u64 {
    5000
}

const fn default_max_try_again() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::SocketAddr;

    #[test]
    fn default_config() {
        let config = ProviderConfig::default();
        assert_eq!(config.preset, Preset::Esens);
        assert_eq!(config.resolver.query_timeout_ms, 5000);
        assert_eq!(config.resolver.max_try_again, 3);
        assert!(config.custom_dns_servers.is_empty());
        assert_eq!(config.sml_info().unwrap(), None);

        let provider = config.into_provider().unwrap();
        assert_eq!(provider.get_naptr_service_name(), Some("Meta:SMP"));
        assert_eq!(provider.get_resolver_settings(), &ResolverSettings::default());
    }

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let config = ProviderConfig::from_toml(
            r#"
            preset = "bpc-smp2"
            use_dns_cache = true
            label_prefix = "B-"
            custom_dns_servers = ["192.0.2.53", "192.0.2.54:5353"]
            sml = "digittest"

            [resolver]
            query_timeout_ms = 2000
            "#,
        )
        .unwrap();
        assert_eq!(config.resolver.max_try_again, 3);
        assert_eq!(
            config.sml_info().unwrap().unwrap().dns_zone(),
            "acc.edelivery.tech.ec.europa.eu."
        );

        let provider = config.into_provider().unwrap();
        assert_eq!(provider.get_naptr_service_name(), Some("oasis-bdxr-smp-2"));
        assert!(provider.is_use_dns_cache());
        assert!(!provider.is_add_identifier_scheme_to_zone());
        assert!(provider.is_lowercase_value_before_hashing());
        assert_eq!(provider.get_label_prefix(), "B-");
        assert_eq!(
            provider.get_custom_dns_servers(),
            &[
                "192.0.2.53:53".parse::<SocketAddr>().unwrap(),
                "192.0.2.54:5353".parse::<SocketAddr>().unwrap(),
            ]
        );
        assert_eq!(
            provider.get_resolver_settings().query_timeout,
            Duration::from_millis(2000)
        );
    }

    #[test]
    fn invalid_values() {
        assert!(matches!(
            ProviderConfig::from_toml("preset = \"smk\""),
            Err(LocateError::Config(_))
        ));

        let config = ProviderConfig::from_toml("custom_dns_servers = [\"dns.example.org\"]").unwrap();
        assert!(matches!(config.into_provider(), Err(LocateError::InvalidInput(_))));

        let config = ProviderConfig::from_toml("sml = \"nope\"").unwrap();
        assert!(matches!(config.sml_info(), Err(LocateError::Config(_))));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "preset = \"peppol\"\nlowercase_value_before_hashing = false").unwrap();

        let config = ProviderConfig::load(file.path()).unwrap();
        assert_eq!(config.preset, Preset::Peppol);
        let provider = config.into_provider().unwrap();
        assert_eq!(provider.get_naptr_service_name(), None);
        assert!(!provider.is_lowercase_value_before_hashing());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProviderConfig::load(&dir.path().join("smp-locate.toml")).unwrap();
        assert_eq!(config, ProviderConfig::default());
    }

    #[test]
    fn config_serialization() {
        let config = ProviderConfig {
            preset: Preset::Bdxl,
            custom_dns_servers: vec!["192.0.2.1".into()],
            ..ProviderConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"preset\":\"bdxl\""));
        let parsed: ProviderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);

        let text = toml::to_string(&config).unwrap();
        assert_eq!(ProviderConfig::from_toml(&text).unwrap(), config);
    }
}

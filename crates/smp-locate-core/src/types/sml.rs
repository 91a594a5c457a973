//! SML (Service Metadata Locator) descriptions.
//!
//! An SML owns a DNS zone under which every registered participant gets a
//! name pointing at its SMP. [`Sml`] lists the well known instances,
//! [`SmlInfo`] describes any instance, including custom ones.

use serde::Serialize;
use std::fmt;
use url::Url;

use crate::error::{LocateError, Result};

/// Label prepended to an SML zone to get the zone SMP hosts are published in.
pub const PUBLISHER_LABEL: &str = "publisher";

/// Path suffix of the SML service metadata management endpoint.
pub const MANAGE_SERVICE_METADATA_PATH: &str = "/manageservicemetadata";

/// Path suffix of the SML participant identifier management endpoint.
pub const MANAGE_PARTICIPANT_IDENTIFIER_PATH: &str = "/manageparticipantidentifier";

/// Anything that names an SML DNS zone.
pub trait DnsZone {
    /// The zone name, normally with a trailing dot (`edelivery.tech.ec.europa.eu.`)
    fn zone_name(&self) -> &str;
}

impl DnsZone for str {
    fn zone_name(&self) -> &str {
        self
    }
}

impl DnsZone for String {
    fn zone_name(&self) -> &str {
        self
    }
}

impl DnsZone for SmlInfo {
    fn zone_name(&self) -> &str {
        &self.dns_zone
    }
}

impl DnsZone for Sml {
    fn zone_name(&self) -> &str {
        self.dns_zone()
    }
}

/// Description of a single SML instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SmlInfo {
    id: String,
    display_name: String,
    dns_zone: String,
    management_service_url: String,
    requires_client_certificate: bool,
}

impl SmlInfo {
    /// Create a new SML description.
    ///
    /// The zone gets a trailing dot if it lacks one, and a single trailing
    /// slash is removed from the management URL.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        dns_zone: impl Into<String>,
        management_service_url: impl Into<String>,
        requires_client_certificate: bool,
    ) -> Result<Self> {
        let id = id.into();
        let display_name = display_name.into();
        let dns_zone = dns_zone.into();
        let management_service_url = management_service_url.into();

        if id.trim().is_empty() {
            return Err(LocateError::invalid_input("SML id may not be empty"));
        }
        if display_name.trim().is_empty() {
            return Err(LocateError::invalid_input("SML display name may not be empty"));
        }

        let dns_zone = canonical_zone(&dns_zone)?;

        let management_service_url = management_service_url
            .strip_suffix('/')
            .unwrap_or(&management_service_url)
            .to_string();
        if management_service_url.is_empty() {
            return Err(LocateError::invalid_input(
                "SML management service URL may not be empty",
            ));
        }
        Url::parse(&management_service_url)
            .map_err(|e| LocateError::malformed_url(&management_service_url, e))?;

        Ok(Self {
            id,
            display_name,
            dns_zone,
            management_service_url,
            requires_client_certificate,
        })
    }

    /// Internal identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human readable name
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// DNS zone, always ending with a dot
    #[must_use]
    pub fn dns_zone(&self) -> &str {
        &self.dns_zone
    }

    /// Zone in which SMP host names are published
    #[must_use]
    pub fn publisher_dns_zone(&self) -> String {
        format!("{PUBLISHER_LABEL}.{}", self.dns_zone)
    }

    /// Base URL of the management web services, without trailing slash
    #[must_use]
    pub fn management_service_url(&self) -> &str {
        &self.management_service_url
    }

    /// Endpoint for managing SMP service metadata
    pub fn manage_service_metadata_endpoint(&self) -> Result<Url> {
        self.endpoint(MANAGE_SERVICE_METADATA_PATH)
    }

    /// Endpoint for managing participant identifiers
    pub fn manage_participant_identifier_endpoint(&self) -> Result<Url> {
        self.endpoint(MANAGE_PARTICIPANT_IDENTIFIER_PATH)
    }

    /// Whether the management services require a TLS client certificate
    #[must_use]
    pub const fn requires_client_certificate(&self) -> bool {
        self.requires_client_certificate
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}{path}", self.management_service_url);
        Url::parse(&raw).map_err(|e| LocateError::malformed_url(raw, e))
    }
}

impl fmt::Display for SmlInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.dns_zone)
    }
}

/// Bring a zone name into canonical form: non-empty, no leading dot,
/// exactly one trailing dot.
pub fn canonical_zone(zone: &str) -> Result<String> {
    let trimmed = zone.trim();
    if trimmed.is_empty() || trimmed == "." {
        return Err(LocateError::invalid_input("SML zone name may not be empty"));
    }
    if trimmed.starts_with('.') {
        return Err(LocateError::invalid_input(format!(
            "SML zone name '{trimmed}' may not start with a dot"
        )));
    }
    if trimmed.ends_with('.') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}."))
    }
}

/// The predefined SML instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sml {
    /// DIGIT production SML, valid since June 9th, 2015
    DigitProduction,
    /// DIGIT test SML (SMK), valid since June 9th, 2015
    DigitTest,
    /// Management application running on localhost
    DevelopmentLocal,
}

impl Sml {
    /// All predefined instances
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::DigitProduction, Self::DigitTest, Self::DevelopmentLocal]
    }

    /// Internal identifier
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::DigitProduction => "digitprod",
            Self::DigitTest => "digittest",
            Self::DevelopmentLocal => "local",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::DigitProduction => "SML",
            Self::DigitTest => "SMK",
            Self::DevelopmentLocal => "Development",
        }
    }

    #[must_use]
    pub const fn dns_zone(self) -> &'static str {
        match self {
            Self::DigitProduction => "edelivery.tech.ec.europa.eu.",
            Self::DigitTest => "acc.edelivery.tech.ec.europa.eu.",
            Self::DevelopmentLocal => "smj.peppolcentral.org.",
        }
    }

    #[must_use]
    pub const fn management_service_url(self) -> &'static str {
        match self {
            Self::DigitProduction => "https://edelivery.tech.ec.europa.eu/edelivery-sml",
            Self::DigitTest => "https://acc.edelivery.tech.ec.europa.eu/edelivery-sml",
            Self::DevelopmentLocal => "http://localhost:8080",
        }
    }

    #[must_use]
    pub const fn requires_client_certificate(self) -> bool {
        matches!(self, Self::DigitProduction | Self::DigitTest)
    }

    /// Full description of this instance
    #[must_use]
    pub fn info(self) -> SmlInfo {
        SmlInfo {
            id: self.id().to_string(),
            display_name: self.display_name().to_string(),
            dns_zone: self.dns_zone().to_string(),
            management_service_url: self.management_service_url().to_string(),
            requires_client_certificate: self.requires_client_certificate(),
        }
    }

    /// Find a predefined instance by its id
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().into_iter().find(|sml| sml.id() == id)
    }

    /// Find a predefined instance by its id, falling back to `default`
    #[must_use]
    pub fn from_id_or(id: &str, default: Self) -> Self {
        Self::from_id(id).unwrap_or(default)
    }
}

impl From<Sml> for SmlInfo {
    fn from(sml: Sml) -> Self {
        sml.info()
    }
}

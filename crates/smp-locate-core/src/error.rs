use std::fmt;

use thiserror::Error;

/// Result type alias for SMP location operations
pub type Result<T> = std::result::Result<T, LocateError>;

/// Boxed underlying cause of a DNS failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when locating the SMP of a participant
#[derive(Error, Debug)]
pub enum LocateError {
    /// Caller supplied something unusable (empty zone, bad DNS server address)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// DNS based resolution of the SMP failed
    #[error(transparent)]
    Dns(#[from] DnsResolutionError),

    /// The host name or rewritten URL does not parse as a URL
    #[error("malformed SMP URL '{url}': {reason}")]
    MalformedUrl {
        /// The offending string
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Configuration is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// A blocking call was made where it cannot run
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Reading a configuration file failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LocateError {
    /// Create a [`LocateError::InvalidInput`] from anything printable
    pub fn invalid_input(reason: impl fmt::Display) -> Self {
        Self::InvalidInput(reason.to_string())
    }

    /// Create a [`LocateError::MalformedUrl`]
    pub fn malformed_url(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::MalformedUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if the participant is simply not registered in the zone
    #[must_use]
    pub fn is_not_registered(&self) -> bool {
        matches!(self, Self::Dns(e) if e.is_not_registered())
    }

    /// Returns true if the failure was caused by the network rather than data
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Dns(e) if e.is_transport())
    }
}

/// Which stage of a NAPTR resolution failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsErrorKind {
    /// Server unreachable, timeout, NXDOMAIN, SERVFAIL or exhausted retries
    Transport,
    /// The answer held no `U` record for the requested service
    NoMatchingRecord,
    /// Matching records existed but none had a usable substitution expression
    Rewrite,
}

impl fmt::Display for DnsErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::NoMatchingRecord => write!(f, "no matching record"),
            Self::Rewrite => write!(f, "rewrite"),
        }
    }
}

/// A failed DNS resolution of a synthetic participant domain name.
#[derive(Error, Debug)]
#[error("DNS resolution of '{domain}' failed ({kind}): {message}")]
pub struct DnsResolutionError {
    domain: String,
    kind: DnsErrorKind,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl DnsResolutionError {
    /// Create an error without an underlying cause
    pub fn new(domain: impl Into<String>, kind: DnsErrorKind, message: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause
    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The synthetic domain name that was queried
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Failure stage
    #[must_use]
    pub const fn kind(&self) -> DnsErrorKind {
        self.kind
    }

    /// Human readable detail
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if DNS answered but holds no usable SMP pointer
    #[must_use]
    pub const fn is_not_registered(&self) -> bool {
        matches!(
            self.kind,
            DnsErrorKind::NoMatchingRecord | DnsErrorKind::Rewrite
        )
    }

    /// Returns true if the DNS infrastructure itself failed
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self.kind, DnsErrorKind::Transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn dns_error_display_names_domain_and_kind() {
        let err = DnsResolutionError::new(
            "ABC.iso6523-actorid-upis.edelivery.tech.ec.europa.eu",
            DnsErrorKind::NoMatchingRecord,
            "no matching NAPTR records",
        );
        let text = err.to_string();
        assert!(text.contains("ABC.iso6523-actorid-upis.edelivery.tech.ec.europa.eu"));
        assert!(text.contains("no matching record"));
        assert!(err.source().is_none());
    }

    #[test]
    fn dns_error_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "server gone");
        let err = DnsResolutionError::new("x.example.", DnsErrorKind::Transport, "lookup failed")
            .with_source(io);
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("server gone"));
    }

    #[test]
    fn classification_helpers() {
        let structural: LocateError =
            DnsResolutionError::new("a", DnsErrorKind::NoMatchingRecord, "none").into();
        assert!(structural.is_not_registered());
        assert!(!structural.is_transport());

        let rewrite: LocateError = DnsResolutionError::new("a", DnsErrorKind::Rewrite, "bad").into();
        assert!(rewrite.is_not_registered());

        let transport: LocateError =
            DnsResolutionError::new("a", DnsErrorKind::Transport, "down").into();
        assert!(transport.is_transport());
        assert!(!transport.is_not_registered());

        assert!(!LocateError::invalid_input("empty zone").is_transport());
    }
}

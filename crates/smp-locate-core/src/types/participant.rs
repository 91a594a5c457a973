use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between scheme and value in the URI-encoded form
pub const SCHEME_VALUE_SEPARATOR: &str = "::";

/// A participant identifier as handed over by the identifier factory.
///
/// Scheme and value are taken as-is; syntax validation happens upstream.
/// An empty scheme means "no scheme".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantIdentifier {
    #[serde(default)]
    scheme: String,
    value: String,
}

impl ParticipantIdentifier {
    /// Create an identifier from scheme and value
    pub fn new(scheme: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            value: value.into(),
        }
    }

    /// Create an identifier that has no scheme
    pub fn without_scheme(value: impl Into<String>) -> Self {
        Self::new(String::new(), value)
    }

    /// Identifier scheme, possibly empty
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Identifier value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether a non-empty scheme is present
    #[must_use]
    pub fn has_scheme(&self) -> bool {
        !self.scheme.is_empty()
    }
}

impl fmt::Display for ParticipantIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_scheme() {
            write!(f, "{}{SCHEME_VALUE_SEPARATOR}{}", self.scheme, self.value)
        } else {
            f.write_str(&self.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_encoded_form() {
        let pid = ParticipantIdentifier::new("iso6523-actorid-upis", "9915:test");
        assert_eq!(pid.to_string(), "iso6523-actorid-upis::9915:test");
        assert!(pid.has_scheme());
    }

    #[test]
    fn missing_scheme() {
        let pid = ParticipantIdentifier::without_scheme("abc");
        assert!(!pid.has_scheme());
        assert_eq!(pid.scheme(), "");
        assert_eq!(pid.to_string(), "abc");
    }

    #[test]
    fn deserialize_without_scheme() {
        let pid: ParticipantIdentifier = serde_json::from_str(r#"{"value":"abc"}"#).unwrap();
        assert_eq!(pid, ParticipantIdentifier::without_scheme("abc"));
    }
}

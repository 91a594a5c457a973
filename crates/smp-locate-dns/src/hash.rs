//! Hash naming of participant identifiers.
//!
//! DNS label = unpadded RFC 4648 Base32 of the SHA-256 digest of the
//! (optionally lower-cased) identifier value. The label is combined with an
//! optional prefix, the identifier scheme and the SML zone:
//!
//! ```text
//! [prefix]BASE32(SHA256(value)) [ "." scheme ] "." zone
//! ```

use base32::Alphabet;
use ring::digest::{digest, SHA256};

/// Length of an encoded label: 256 bits in 5-bit Base32 groups.
pub const LABEL_LEN: usize = 52;

/// Hash a participant identifier value into a DNS label.
///
/// Lower-casing uses the Unicode default case mapping, which does not depend
/// on the process locale.
#[must_use]
pub fn encode_participant_value(value: &str, lowercase_before_hashing: bool) -> String {
    let hash = if lowercase_before_hashing {
        digest(&SHA256, value.to_lowercase().as_bytes())
    } else {
        digest(&SHA256, value.as_bytes())
    };

    let encoded = base32::encode(Alphabet::Rfc4648 { padding: false }, hash.as_ref());
    encoded.trim_end_matches('=').to_ascii_uppercase()
}

/// Assemble the synthetic domain name of a participant.
///
/// An empty `scheme` is skipped. A single trailing dot is removed, so the
/// result is a plain host name.
#[must_use]
pub fn build_dns_name(label_prefix: &str, label: &str, scheme: Option<&str>, zone: &str) -> String {
    let mut name = String::with_capacity(label_prefix.len() + label.len() + zone.len() + 64);
    name.push_str(label_prefix);
    name.push_str(label);
    if let Some(scheme) = scheme.filter(|s| !s.is_empty()) {
        name.push('.');
        name.push_str(scheme);
    }
    name.push('.');
    name.push_str(zone);

    if name.ends_with('.') {
        name.pop();
    }
    name
}

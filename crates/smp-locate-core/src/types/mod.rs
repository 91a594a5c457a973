//! Data model shared by the resolution crates.

mod participant;
mod sml;

pub use participant::{ParticipantIdentifier, SCHEME_VALUE_SEPARATOR};
pub use sml::{
    canonical_zone, DnsZone, Sml, SmlInfo, MANAGE_PARTICIPANT_IDENTIFIER_PATH,
    MANAGE_SERVICE_METADATA_PATH, PUBLISHER_LABEL,
};

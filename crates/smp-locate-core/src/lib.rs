//! Core types and errors for locating Service Metadata Publishers.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - **Types**: participant identifiers, SML descriptions and the
//!   predefined SML instances
//! - **Errors**: the [`LocateError`] taxonomy, including the tagged
//!   [`DnsResolutionError`]
//!
//! # Example
//!
//! ```rust
//! use smp_locate_core::{DnsZone, ParticipantIdentifier, Sml};
//!
//! let pid = ParticipantIdentifier::new("iso6523-actorid-upis", "9915:test");
//! assert_eq!(pid.to_string(), "iso6523-actorid-upis::9915:test");
//! assert_eq!(Sml::DigitTest.zone_name(), "acc.edelivery.tech.ec.europa.eu.");
//! ```

mod error;
pub mod types;

pub use error::{BoxError, DnsErrorKind, DnsResolutionError, LocateError, Result};
pub use types::*;

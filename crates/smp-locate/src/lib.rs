//! Resolve participant identifiers to the Service Metadata Publisher (SMP)
//! that holds their metadata.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use smp_locate::{ParticipantIdentifier, Sml, UrlProvider};
//!
//! #[tokio::main]
//! async fn main() -> smp_locate::Result<()> {
//!     let provider = UrlProvider::bdxl();
//!     let pid = ParticipantIdentifier::new("iso6523-actorid-upis", "9915:test");
//!
//!     // Synthetic name, no network access
//!     let name = provider.dns_name_of_participant(&pid, &Sml::DigitTest)?;
//!     println!("DNS name: {name}");
//!
//!     // NAPTR lookup, rewritten into the SMP base URL
//!     let url = provider.smp_url_of_participant(&pid, &Sml::DigitTest).await?;
//!     println!("SMP: {url}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Presets
//!
//! | Preset                     | NAPTR service      | Scheme in name | Cache |
//! |----------------------------|--------------------|----------------|-------|
//! | [`UrlProvider::peppol`]    | none               | yes            | n/a   |
//! | [`UrlProvider::esens`]     | `Meta:SMP`         | yes            | yes   |
//! | [`UrlProvider::bdxl`]      | `Meta:SMP`         | yes            | yes   |
//! | [`UrlProvider::bpc_smp2`]  | `oasis-bdxr-smp-2` | no             | no    |

pub mod config;
pub mod provider;

pub use config::{ProviderConfig, ResolverConfig};
pub use provider::{
    smp_base_url, Preset, ResolveOptions, UrlProvider, NAPTR_SERVICE_BDXR_SMP2,
    NAPTR_SERVICE_META_SMP,
};

// Re-export core types
pub use smp_locate_core::*;

// Re-export the DNS building blocks
pub use smp_locate_dns as dns;
pub use smp_locate_dns::{NaptrLookup, ResolverSettings, StaticNaptrLookup};

//! Validation engine for Calico resources.
//!
//! Resources (network policies, IP pools, BGP and Felix configuration, alerts,
//! threat feeds and friends) are checked in two tiers: a catalog of named field
//! rules runs over every bound field, and only if all of those pass does the
//! kind's struct rule check cross-field invariants. Failures come back as one
//! ordered [`ValidationError`] naming each field, its value and the reason.
//!
//! ```text
//! parse(yaml) → Resource → validate(&r) → Result<(), ValidationError>
//!                        → normalize(r) → Resource → serialize(&r) → yaml
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! let yaml = r#"
//! apiVersion: projectcalico.org/v3
//! kind: IPPool
//! metadata:
//!   name: pool-1
//! spec:
//!   cidr: 10.1.0.0/16
//! "#;
//!
//! let resource = calico_validator::load(yaml).expect("valid pool");
//! if let calico_validator::Resource::IPPool(pool) = resource {
//!     assert_eq!(pool.spec.block_size, Some(26));
//! }
//! ```
//!
//! A custom [`RuleRegistry`] carries its own [`ValidatorConfig`] limits:
//!
//! ```rust
//! use calico_validator::{RuleRegistry, ValidatorConfig};
//!
//! let config = ValidatorConfig::from_yaml("alertMinPeriod: 5m").unwrap();
//! let registry = RuleRegistry::with_config(config).unwrap();
//! assert_eq!(registry.limits().alert_min_period.as_secs(), 300);
//! ```

pub mod config;
pub mod enums;
pub mod error;
pub mod fields;
pub mod net;
pub mod normalize;
pub mod parse;
pub mod primitives;
pub mod query;
pub mod registry;
pub mod report_template;
pub mod schema;
pub mod selector;
pub mod serialize;
pub mod template;
pub mod types;
pub mod validate;

pub(crate) mod checks;

pub use config::{Limits, ValidatorConfig};
pub use error::*;
pub use registry::{Report, RuleRegistry, RuleRegistryBuilder, StructRule};
pub use types::*;

pub use normalize::normalize;
pub use parse::parse;
pub use serialize::serialize;
pub use validate::validate;

/// Parses, validates and normalizes one resource document.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] if the YAML cannot be decoded, or
/// [`LoadError::Validation`] carrying every error of the failing tier.
pub fn load(input: &str) -> Result<Resource, LoadError> {
    let resource = parse::parse(input)?;
    validate::validate(&resource)?;
    Ok(normalize::normalize(resource))
}

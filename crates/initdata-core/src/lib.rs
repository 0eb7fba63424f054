//! Validation and generation of signed launch-parameter bundles.
//!
//! This crate provides:
//! - [`Validator`]: parse, canonicalize, check the digest, check freshness,
//!   decode the user profile
//! - [`Generator`]: the inverse, producing bundles the validator accepts
//! - [`ValidatorConfig`]: credential, domain constant and policies
//!
//! Core invariants:
//! - Only `hash` (and, by policy, `signature`) is left out of the digest input
//! - The secret is derived once per validator and never leaves it
//! - Every failure is returned as a value; nothing panics on bad input
//!
//! ```rust
//! use initdata_core::{GenerateRequest, UserProfile, Validator, ValidatorConfig};
//!
//! let validator = Validator::new(ValidatorConfig::new("123:ABC"));
//! let bundle = validator
//!     .generator()
//!     .generate(&GenerateRequest::new(UserProfile::new(1, "A")));
//!
//! let accepted = validator.validate(&bundle.init_data).into_result()?;
//! assert_eq!(accepted.profile.first_name, "A");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
#![deny(missing_docs)]

/// Validator configuration.
pub mod config;
/// Error types for validation and configuration.
pub mod errors;
/// Issuance-time checks.
pub mod freshness;
/// Bundle construction.
pub mod generator;
/// User profile payload.
pub mod profile;
/// The validation pipeline and its outcome.
pub mod validator;

pub use config::ValidatorConfig;
pub use errors::{ConfigError, ValidationError};
pub use freshness::{FreshnessPolicy, DEFAULT_MAX_AGE_SECS};
pub use generator::{GenerateRequest, GeneratedBundle, Generator};
pub use profile::{decode_profile, encode_profile, UserProfile};
pub use validator::{Diagnostics, ValidatedData, ValidationFailure, ValidationOutcome, Validator};

/// Field carrying the issuance time in epoch seconds.
pub const AUTH_DATE_FIELD: &str = "auth_date";
/// Field carrying the percent-encoded user profile JSON.
pub const USER_FIELD: &str = "user";
/// Session identifier field.
pub const QUERY_ID_FIELD: &str = "query_id";
/// Chat-instance field.
pub const CHAT_INSTANCE_FIELD: &str = "chat_instance";
/// Chat-type field.
pub const CHAT_TYPE_FIELD: &str = "chat_type";

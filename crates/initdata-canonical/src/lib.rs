//! Wire-level primitives for signed launch-parameter bundles ("initData").
//!
//! A bundle is an `&`-joined list of percent-encoded `name=value` pairs. One
//! of them, `hash`, carries a keyed digest over the bundle's *data-check
//! string*: every other field, percent-decoded, sorted by name and joined
//! with `\n`. The digest key is itself derived from a long-lived credential:
//!
//! ```text
//! secret = HMAC-SHA256(key = domain_constant, message = credential)
//! digest = hex(HMAC-SHA256(key = secret, message = data_check_string))
//! ```
//!
//! This crate holds no clock and no policy. Freshness, payload decoding and
//! the full validation pipeline live in `initdata-core`.
//!
#![deny(missing_docs)]

/// Data-check string construction.
pub mod canonicalizer;
/// Keyed digest computation and comparison.
pub mod digest;
/// Percent codec for bundle values.
pub mod encoding;
/// Bundle field parsing.
pub mod params;
/// Secret derivation from a credential.
pub mod secret;

pub use canonicalizer::{CanonicalString, Canonicalizer, SignaturePolicy};
pub use digest::{Digest, DigestParseError, HashEngine};
pub use encoding::{decode_component, encode_component};
pub use params::{ParameterSet, ParseReport};
pub use secret::{DomainConstant, SecretKey};

/// Name of the field that carries the bundle digest.
pub const HASH_FIELD: &str = "hash";
/// Name of the platform signature field whose inclusion is policy-driven.
pub const SIGNATURE_FIELD: &str = "signature";

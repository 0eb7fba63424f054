use std::fmt;

use serde::{Deserialize, Serialize};

use crate::encoding::decode_component;
use crate::params::ParameterSet;
use crate::{HASH_FIELD, SIGNATURE_FIELD};

/// Whether the platform `signature` field participates in the data-check string.
///
/// Issuers have shipped both behaviours; a deployment must match its issuer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignaturePolicy {
    /// `signature` is hashed like any other field.
    #[default]
    Include,
    /// `signature` is dropped along with `hash`.
    Exclude,
}

/// Newline-joined `name=value` lines, sorted by name, values decoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalString(String);

impl CanonicalString {
    /// The canonical text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// UTF-8 bytes fed to the keyed hash.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Consumes the wrapper.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds data-check strings from parsed bundles.
#[derive(Debug, Clone, Default)]
pub struct Canonicalizer {
    signature: SignaturePolicy,
}

impl Canonicalizer {
    /// Creates a canonicalizer for the given signature policy.
    pub fn new(signature: SignaturePolicy) -> Self {
        Self { signature }
    }

    /// Active signature policy.
    pub fn signature_policy(&self) -> SignaturePolicy {
        self.signature
    }

    /// Whether `name` is left out of the data-check string.
    pub fn is_excluded(&self, name: &str) -> bool {
        name == HASH_FIELD
            || (self.signature == SignaturePolicy::Exclude && name == SIGNATURE_FIELD)
    }

    /// Produces the canonical string for `params`.
    ///
    /// Total and deterministic: the same field set yields the same string no
    /// matter how the wire order looked.
    pub fn canonicalize(&self, params: &ParameterSet) -> CanonicalString {
        // ParameterSet iterates in byte order of the name already.
        let lines: Vec<String> = params
            .iter()
            .filter(|(name, _)| !self.is_excluded(name))
            .map(|(name, raw)| format!("{}={}", name, decode_component(raw)))
            .collect();
        CanonicalString(lines.join("\n"))
    }

    /// Names of the fields that made it into the canonical string.
    pub fn included_fields(&self, params: &ParameterSet) -> Vec<String> {
        params
            .iter()
            .map(|(name, _)| name)
            .filter(|name| !self.is_excluded(name))
            .map(str::to_string)
            .collect()
    }
}

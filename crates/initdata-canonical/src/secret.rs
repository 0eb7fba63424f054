use std::fmt;

use serde::{Deserialize, Serialize};

use crate::digest::hmac_sha256;

/// Key used to derive per-credential secrets. The platform uses `WebAppData`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainConstant(String);

impl DomainConstant {
    /// The platform's published constant.
    pub const PLATFORM: &'static str = "WebAppData";

    /// Creates a domain constant from any string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw bytes used as the HMAC key.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl Default for DomainConstant {
    fn default() -> Self {
        Self::new(Self::PLATFORM)
    }
}

impl From<&str> for DomainConstant {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DomainConstant {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for DomainConstant {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 32-byte key for the bundle digest, derived from a credential.
///
/// Never serialized; `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Derives `HMAC-SHA256(key = domain, message = credential.trim())`.
    ///
    /// Pure: the same domain and credential always give the same key.
    pub fn derive(domain: &DomainConstant, credential: &str) -> Self {
        Self(hmac_sha256(domain.as_bytes(), credential.trim().as_bytes()))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

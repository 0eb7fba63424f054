use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::canonicalizer::CanonicalString;
use crate::secret::SecretKey;

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 output in bytes.
pub const DIGEST_LEN: usize = 32;

/// HMAC-SHA256 of `message` under `key`.
///
/// HMAC pads or pre-hashes keys of any length, so construction never fails.
pub(crate) fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; DIGEST_LEN] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(message);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// Error returned when a digest string is not 64 hex characters.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DigestParseError {
    /// Input has the wrong number of characters.
    #[error("digest must be {expected} hex characters, got {actual}")]
    Length {
        /// Required length.
        expected: usize,
        /// Observed length.
        actual: usize,
    },
    /// Input contains a non-hex character.
    #[error("digest is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// Bundle digest: HMAC-SHA256 output, displayed as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Parses a hex digest, accepting either letter case.
    pub fn from_hex(value: &str) -> Result<Self, DigestParseError> {
        if value.len() != DIGEST_LEN * 2 {
            return Err(DigestParseError::Length {
                expected: DIGEST_LEN * 2,
                actual: value.len(),
            });
        }
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(value, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Lowercase hex form, as placed on the wire.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Case-insensitive, constant-time comparison against a received value.
    ///
    /// Anything that is not a 64-character hex string never matches.
    pub fn matches_hex(&self, received: &str) -> bool {
        match Digest::from_hex(received) {
            Ok(other) => self.0[..].ct_eq(&other.0[..]).into(),
            Err(_) => false,
        }
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

/// Computes and checks bundle digests under one secret.
#[derive(Debug, Clone)]
pub struct HashEngine {
    secret: SecretKey,
}

impl HashEngine {
    /// Binds an engine to a derived secret.
    pub fn new(secret: SecretKey) -> Self {
        Self { secret }
    }

    /// `HMAC-SHA256(key = secret, message = canonical)`.
    pub fn compute(&self, canonical: &CanonicalString) -> Digest {
        Digest(hmac_sha256(self.secret.as_bytes(), canonical.as_bytes()))
    }

    /// Recomputes the digest and compares it with `received`.
    pub fn verify(&self, received: &str, canonical: &CanonicalString) -> bool {
        self.compute(canonical).matches_hex(received)
    }
}

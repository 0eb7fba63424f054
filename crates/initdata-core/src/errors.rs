use thiserror::Error;

/// Why a bundle was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The bundle has no (or an empty) `hash` field.
    #[error("bundle has no hash field")]
    MissingDigest,
    /// The recomputed digest differs from the received one.
    #[error("hash mismatch: computed {computed}, received {received}")]
    DigestMismatch {
        /// Digest carried by the bundle.
        received: String,
        /// Digest recomputed from the canonical string.
        computed: String,
    },
    /// `auth_date` is absent or not an integer.
    #[error("auth_date is missing or malformed: {raw:?}")]
    MissingOrMalformedTimestamp {
        /// Raw field value, if the field was present.
        raw: Option<String>,
    },
    /// The bundle is older than the freshness window.
    #[error("bundle is {age_secs} seconds old (max {max_age_secs})")]
    Stale {
        /// Seconds since issuance.
        age_secs: i64,
        /// Allowed maximum.
        max_age_secs: u64,
    },
    /// The bundle has no (or an empty) `user` field.
    #[error("bundle has no user field")]
    MissingProfile,
    /// The `user` field is not a JSON object with `id` and `first_name`.
    #[error("user profile is malformed: {0}")]
    MalformedProfile(String),
}

impl ValidationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingDigest => "missing_digest",
            ValidationError::DigestMismatch { .. } => "digest_mismatch",
            ValidationError::MissingOrMalformedTimestamp { .. } => {
                "missing_or_malformed_timestamp"
            }
            ValidationError::Stale { .. } => "stale",
            ValidationError::MissingProfile => "missing_profile",
            ValidationError::MalformedProfile(_) => "malformed_profile",
        }
    }
}

/// Configuration could not be assembled.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No credential was supplied, or it was blank.
    #[error("credential is missing (set {0})")]
    MissingCredential(&'static str),
    /// An environment variable holds an unusable value.
    #[error("{name} has invalid value {value:?}")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
}

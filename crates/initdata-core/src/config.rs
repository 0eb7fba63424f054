use std::env;
use std::fmt;

use initdata_canonical::{DomainConstant, SignaturePolicy};
use serde::Deserialize;

use crate::errors::ConfigError;
use crate::freshness::FreshnessPolicy;

/// Environment variable holding the credential.
pub const CREDENTIAL_ENV: &str = "INITDATA_CREDENTIAL";
/// Environment variable overriding the freshness window (seconds).
pub const MAX_AGE_ENV: &str = "INITDATA_MAX_AGE_SECS";
/// Environment variable disabling the freshness check (`true`/`1`).
pub const SKIP_FRESHNESS_ENV: &str = "INITDATA_SKIP_FRESHNESS";
/// Environment variable excluding `signature` from the digest input.
pub const EXCLUDE_SIGNATURE_ENV: &str = "INITDATA_EXCLUDE_SIGNATURE";
/// Environment variable overriding the domain constant.
pub const DOMAIN_CONSTANT_ENV: &str = "INITDATA_DOMAIN_CONSTANT";

/// Everything a [`Validator`](crate::Validator) needs.
///
/// Deserializable so host services can embed it in their own config files;
/// only `credential` is required.
#[derive(Clone, Deserialize)]
pub struct ValidatorConfig {
    /// Long-lived issuer credential. Surrounding whitespace is ignored.
    pub credential: String,
    /// Key for the secret derivation.
    #[serde(default)]
    pub domain_constant: DomainConstant,
    /// Issuance-time policy.
    #[serde(default)]
    pub freshness: FreshnessPolicy,
    /// Whether `signature` is part of the digest input.
    #[serde(default)]
    pub signature_policy: SignaturePolicy,
}

impl ValidatorConfig {
    /// Platform defaults for `credential`.
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            domain_constant: DomainConstant::default(),
            freshness: FreshnessPolicy::default(),
            signature_policy: SignaturePolicy::default(),
        }
    }

    /// Reads the configuration from `INITDATA_*` environment variables.
    ///
    /// `INITDATA_CREDENTIAL` is required; every other variable falls back to
    /// its default when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let credential = env::var(CREDENTIAL_ENV)
            .ok()
            .filter(|c| !c.trim().is_empty())
            .ok_or(ConfigError::MissingCredential(CREDENTIAL_ENV))?;
        Self::new(credential).apply_env()
    }

    /// Overlays every `INITDATA_*` setting except the credential.
    ///
    /// Lets a credential from another source (a CLI flag, a secrets file)
    /// share the environment's policies.
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(value) = env::var(MAX_AGE_ENV) {
            let max_age = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: MAX_AGE_ENV,
                value: value.clone(),
            })?;
            self.freshness.max_age_secs = max_age;
        }
        if let Some(skip) = read_flag(SKIP_FRESHNESS_ENV)? {
            self.freshness.enforce = !skip;
        }
        if let Some(policy) = signature_policy_from_env()? {
            self.signature_policy = policy;
        }
        if let Ok(domain) = env::var(DOMAIN_CONSTANT_ENV) {
            self.domain_constant = DomainConstant::new(domain);
        }
        Ok(self)
    }

    /// Replaces the freshness policy.
    pub fn with_freshness(mut self, freshness: FreshnessPolicy) -> Self {
        self.freshness = freshness;
        self
    }

    /// Replaces the signature policy.
    pub fn with_signature_policy(mut self, policy: SignaturePolicy) -> Self {
        self.signature_policy = policy;
        self
    }

    /// Replaces the domain constant.
    pub fn with_domain_constant(mut self, domain: impl Into<DomainConstant>) -> Self {
        self.domain_constant = domain.into();
        self
    }

    /// Part of the credential before the first `:`, safe to log.
    pub fn credential_id(&self) -> &str {
        credential_id(&self.credential)
    }
}

impl fmt::Debug for ValidatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorConfig")
            .field("credential", &format_args!("{}:<redacted>", self.credential_id()))
            .field("domain_constant", &self.domain_constant)
            .field("freshness", &self.freshness)
            .field("signature_policy", &self.signature_policy)
            .finish()
    }
}

/// Signature policy set by `INITDATA_EXCLUDE_SIGNATURE`, if the variable is set.
///
/// Needs no credential, so tools that only canonicalize can honour it too.
pub fn signature_policy_from_env() -> Result<Option<SignaturePolicy>, ConfigError> {
    Ok(read_flag(EXCLUDE_SIGNATURE_ENV)?.map(|exclude| {
        if exclude {
            SignaturePolicy::Exclude
        } else {
            SignaturePolicy::Include
        }
    }))
}

pub(crate) fn credential_id(credential: &str) -> &str {
    match credential.trim().split_once(':') {
        Some((id, _)) => id,
        None => "unknown",
    }
}

fn read_flag(name: &'static str) -> Result<Option<bool>, ConfigError> {
    let Ok(value) = env::var(name) else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(Some(true)),
        "0" | "false" | "no" | "" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidValue { name, value }),
    }
}

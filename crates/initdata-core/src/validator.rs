use chrono::{TimeZone, Utc};
use initdata_canonical::{Canonicalizer, HashEngine, ParameterSet, SecretKey, HASH_FIELD};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{credential_id, ValidatorConfig};
use crate::errors::{ConfigError, ValidationError};
use crate::freshness::{parse_issued_at, FreshnessPolicy};
use crate::generator::Generator;
use crate::profile::{decode_profile, UserProfile};
use crate::{AUTH_DATE_FIELD, USER_FIELD};

/// What the pipeline saw before it stopped. Never holds the secret or credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Length of the raw bundle in bytes.
    pub init_data_length: usize,
    /// Credential prefix before `:` (or `unknown`).
    pub credential_id: String,
    /// Field names found in the bundle, sorted.
    pub parsed_fields: Vec<String>,
    /// Segments skipped by the parser.
    pub dropped_pairs: usize,
    /// Digest carried by the bundle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_digest: Option<String>,
    /// Digest recomputed locally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_digest: Option<String>,
    /// Data-check string the digest was computed over.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_string: Option<String>,
    /// Result of the digest comparison.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest_matches: Option<bool>,
    /// Parsed `auth_date`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
    /// `auth_date` as RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at_utc: Option<String>,
    /// Seconds between issuance and validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_secs: Option<i64>,
}

/// Accepted bundle contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedData {
    /// Decoded user profile.
    pub profile: UserProfile,
    /// Issuance time, epoch seconds.
    pub issued_at: i64,
}

/// Rejection reason plus the context gathered up to that point.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ValidationFailure {
    /// Why the bundle was rejected.
    pub reason: ValidationError,
    /// Pipeline context.
    pub diagnostics: Diagnostics,
}

/// Result of validating one bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The bundle is authentic, fresh enough and carries a usable profile.
    Valid {
        /// Decoded user profile.
        profile: UserProfile,
        /// Issuance time, epoch seconds.
        issued_at: i64,
    },
    /// The bundle was rejected.
    Invalid {
        /// Why.
        reason: ValidationError,
        /// Pipeline context.
        diagnostics: Box<Diagnostics>,
    },
}

impl ValidationOutcome {
    /// Whether the bundle was accepted.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid { .. })
    }

    /// Rejection reason, if any.
    pub fn reason(&self) -> Option<&ValidationError> {
        match self {
            ValidationOutcome::Valid { .. } => None,
            ValidationOutcome::Invalid { reason, .. } => Some(reason),
        }
    }

    /// Converts into a `Result` for `?`-style callers.
    pub fn into_result(self) -> Result<ValidatedData, ValidationFailure> {
        match self {
            ValidationOutcome::Valid { profile, issued_at } => {
                Ok(ValidatedData { profile, issued_at })
            }
            ValidationOutcome::Invalid {
                reason,
                diagnostics,
            } => Err(ValidationFailure {
                reason,
                diagnostics: *diagnostics,
            }),
        }
    }
}

/// Validates bundles issued for one credential.
///
/// The secret is derived once in [`Validator::new`]; afterwards the validator
/// is read-only and can be shared across threads.
#[derive(Debug, Clone)]
pub struct Validator {
    canonicalizer: Canonicalizer,
    engine: HashEngine,
    freshness: FreshnessPolicy,
    credential_id: String,
}

impl Validator {
    /// Builds a validator and derives its secret.
    pub fn new(config: ValidatorConfig) -> Self {
        let secret = SecretKey::derive(&config.domain_constant, &config.credential);
        Self {
            canonicalizer: Canonicalizer::new(config.signature_policy),
            engine: HashEngine::new(secret),
            freshness: config.freshness,
            credential_id: credential_id(&config.credential).to_string(),
        }
    }

    /// Builds a validator from `INITDATA_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        ValidatorConfig::from_env().map(Self::new)
    }

    /// Freshness policy in force.
    pub fn freshness(&self) -> FreshnessPolicy {
        self.freshness
    }

    /// Canonicalizer in force.
    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    /// Generator sharing this validator's secret and canonicalizer.
    pub fn generator(&self) -> Generator {
        Generator::from_parts(self.canonicalizer.clone(), self.engine.clone())
    }

    /// Validates `init_data` against the current wall-clock time.
    pub fn validate(&self, init_data: &str) -> ValidationOutcome {
        self.validate_at(init_data, Utc::now().timestamp())
    }

    /// Validates `init_data` as if the current time were `now` (epoch seconds).
    pub fn validate_at(&self, init_data: &str, now: i64) -> ValidationOutcome {
        let mut diagnostics = Diagnostics {
            init_data_length: init_data.len(),
            credential_id: self.credential_id.clone(),
            ..Diagnostics::default()
        };

        match self.run(init_data, now, &mut diagnostics) {
            Ok(data) => {
                info!(
                    credential_id = %self.credential_id,
                    user_id = data.profile.id,
                    "initData accepted"
                );
                ValidationOutcome::Valid {
                    profile: data.profile,
                    issued_at: data.issued_at,
                }
            }
            Err(reason) => {
                info!(
                    credential_id = %self.credential_id,
                    reason = reason.code(),
                    "initData rejected"
                );
                ValidationOutcome::Invalid {
                    reason,
                    diagnostics: Box::new(diagnostics),
                }
            }
        }
    }

    fn run(
        &self,
        init_data: &str,
        now: i64,
        diagnostics: &mut Diagnostics,
    ) -> Result<ValidatedData, ValidationError> {
        let (params, report) = ParameterSet::parse_with_report(init_data);
        diagnostics.parsed_fields = params.field_names();
        diagnostics.dropped_pairs = report.dropped_pairs;

        let received = params
            .get(HASH_FIELD)
            .filter(|h| !h.is_empty())
            .ok_or(ValidationError::MissingDigest)?;
        diagnostics.received_digest = Some(received.to_string());

        let canonical = self.canonicalizer.canonicalize(&params);
        let computed = self.engine.compute(&canonical);
        let matches = computed.matches_hex(received);
        diagnostics.canonical_string = Some(canonical.as_str().to_string());
        diagnostics.computed_digest = Some(computed.to_hex());
        diagnostics.digest_matches = Some(matches);
        debug!(
            received = received,
            computed = %computed,
            fields = ?self.canonicalizer.included_fields(&params),
            "initData digest check"
        );

        if !matches {
            warn!(
                credential_id = %self.credential_id,
                fields = ?diagnostics.parsed_fields,
                "initData hash mismatch"
            );
            return Err(ValidationError::DigestMismatch {
                received: received.to_string(),
                computed: computed.to_hex(),
            });
        }

        let issued_at = parse_issued_at(params.get(AUTH_DATE_FIELD))?;
        let age_secs = FreshnessPolicy::age(issued_at, now);
        diagnostics.issued_at = Some(issued_at);
        diagnostics.issued_at_utc = Utc
            .timestamp_opt(issued_at, 0)
            .single()
            .map(|t| t.to_rfc3339());
        diagnostics.age_secs = Some(age_secs);

        if let Err(stale) = self.freshness.check(issued_at, now) {
            warn!(
                issued_at,
                age_secs,
                max_age_secs = self.freshness.max_age_secs,
                "initData is too old"
            );
            return Err(stale);
        }

        let profile = decode_profile(params.get(USER_FIELD))?;
        Ok(ValidatedData { profile, issued_at })
    }
}

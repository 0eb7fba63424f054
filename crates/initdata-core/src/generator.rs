use chrono::Utc;
use initdata_canonical::{
    CanonicalString, Canonicalizer, Digest, HashEngine, ParameterSet, SecretKey, HASH_FIELD,
    SIGNATURE_FIELD,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ValidatorConfig;
use crate::profile::{encode_profile, UserProfile};
use crate::{AUTH_DATE_FIELD, CHAT_INSTANCE_FIELD, CHAT_TYPE_FIELD, QUERY_ID_FIELD, USER_FIELD};

/// Contents of a bundle to sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Profile placed in the `user` field.
    pub profile: UserProfile,
    /// Session identifier (`query_id`).
    #[serde(default)]
    pub query_id: Option<String>,
    /// `chat_instance` value.
    #[serde(default)]
    pub chat_instance: Option<String>,
    /// `chat_type` value.
    #[serde(default)]
    pub chat_type: Option<String>,
    /// Platform `signature` value, passed through as an ordinary field.
    #[serde(default)]
    pub signature: Option<String>,
}

impl GenerateRequest {
    /// Request carrying only a profile.
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            query_id: None,
            chat_instance: None,
            chat_type: None,
            signature: None,
        }
    }

    /// Sets `query_id`.
    pub fn with_query_id(mut self, query_id: impl Into<String>) -> Self {
        self.query_id = Some(query_id.into());
        self
    }

    /// Sets `chat_instance`.
    pub fn with_chat_instance(mut self, chat_instance: impl Into<String>) -> Self {
        self.chat_instance = Some(chat_instance.into());
        self
    }

    /// Sets `chat_type`.
    pub fn with_chat_type(mut self, chat_type: impl Into<String>) -> Self {
        self.chat_type = Some(chat_type.into());
        self
    }

    /// Sets `signature`.
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    fn fields(&self, issued_at: i64) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            (AUTH_DATE_FIELD, issued_at.to_string()),
            (USER_FIELD, encode_profile(&self.profile)),
        ];
        let optional = [
            (QUERY_ID_FIELD, &self.query_id),
            (CHAT_INSTANCE_FIELD, &self.chat_instance),
            (CHAT_TYPE_FIELD, &self.chat_type),
            (SIGNATURE_FIELD, &self.signature),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                fields.push((name, value.clone()));
            }
        }
        fields
    }
}

/// A signed bundle and the intermediate values used to build it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedBundle {
    /// Wire string: sorted `name=value` pairs, then `hash`.
    pub init_data: String,
    /// `auth_date` that was stamped.
    pub issued_at: i64,
    /// Digest appended as `hash`.
    pub digest: Digest,
    /// Data-check string the digest covers.
    pub canonical: CanonicalString,
}

/// Produces bundles that a [`Validator`](crate::Validator) with the same
/// configuration accepts.
#[derive(Debug, Clone)]
pub struct Generator {
    canonicalizer: Canonicalizer,
    engine: HashEngine,
}

impl Generator {
    /// Derives the secret from `config`; freshness settings are ignored.
    pub fn new(config: &ValidatorConfig) -> Self {
        let secret = SecretKey::derive(&config.domain_constant, &config.credential);
        Self::from_parts(
            Canonicalizer::new(config.signature_policy),
            HashEngine::new(secret),
        )
    }

    pub(crate) fn from_parts(canonicalizer: Canonicalizer, engine: HashEngine) -> Self {
        Self {
            canonicalizer,
            engine,
        }
    }

    /// Signs `request` stamped with the current wall-clock time.
    pub fn generate(&self, request: &GenerateRequest) -> GeneratedBundle {
        self.generate_at(request, Utc::now().timestamp())
    }

    /// Signs `request` with `auth_date = issued_at`.
    pub fn generate_at(&self, request: &GenerateRequest, issued_at: i64) -> GeneratedBundle {
        // Values are stored encoded so the canonicalizer decodes them back verbatim.
        let params = ParameterSet::from_decoded(request.fields(issued_at));
        let canonical = self.canonicalizer.canonicalize(&params);
        let digest = self.engine.compute(&canonical);
        let init_data = format!("{}&{}={}", params.to_query_string(), HASH_FIELD, digest);

        debug!(
            fields = ?params.field_names(),
            issued_at,
            digest = %digest,
            "generated initData"
        );

        GeneratedBundle {
            init_data,
            issued_at,
            digest,
            canonical,
        }
    }
}

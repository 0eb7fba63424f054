use initdata_canonical::decode_component;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// User record carried in the bundle's `user` field.
///
/// Field order here is the order [`encode_profile`] writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Platform user identifier.
    pub id: i64,
    /// First name (required).
    pub first_name: String,
    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Public handle without `@`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// IETF language tag of the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Whether the user allowed the bot to message them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allows_write_to_pm: Option<bool>,
}

impl UserProfile {
    /// Profile with only the required fields set.
    pub fn new(id: i64, first_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: None,
            username: None,
            language_code: None,
            photo_url: None,
            allows_write_to_pm: None,
        }
    }

    /// Sets the last name.
    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Sets the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the language code.
    pub fn with_language_code(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = Some(language_code.into());
        self
    }

    /// Sets the photo URL.
    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }

    /// Sets the write-access flag.
    pub fn with_allows_write_to_pm(mut self, allows: bool) -> Self {
        self.allows_write_to_pm = Some(allows);
        self
    }
}

/// Decodes the raw (percent-encoded) `user` field.
pub fn decode_profile(raw: Option<&str>) -> Result<UserProfile, ValidationError> {
    let raw = raw
        .filter(|r| !r.is_empty())
        .ok_or(ValidationError::MissingProfile)?;
    let json = decode_component(raw);
    serde_json::from_str(&json).map_err(|e| ValidationError::MalformedProfile(e.to_string()))
}

/// Compact JSON for the `user` field; absent optionals are omitted.
pub fn encode_profile(profile: &UserProfile) -> String {
    // Plain struct of strings, integers and booleans: serialization cannot fail.
    serde_json::to_string(profile).unwrap_or_default()
}

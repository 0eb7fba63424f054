use initdata_canonical::decode_component;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Default freshness window: one day.
pub const DEFAULT_MAX_AGE_SECS: u64 = 86_400;

/// Parses the raw `auth_date` value into epoch seconds.
pub fn parse_issued_at(raw: Option<&str>) -> Result<i64, ValidationError> {
    let malformed = || ValidationError::MissingOrMalformedTimestamp {
        raw: raw.map(str::to_string),
    };
    let raw = raw.ok_or_else(malformed)?;
    decode_component(raw).parse::<i64>().map_err(|_| malformed())
}

/// How old a bundle may be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessPolicy {
    /// When false, age is reported but never rejected.
    pub enforce: bool,
    /// Maximum accepted age in seconds.
    pub max_age_secs: u64,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            enforce: true,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
        }
    }
}

impl FreshnessPolicy {
    /// Enforced policy with a custom window.
    pub fn with_max_age(max_age_secs: u64) -> Self {
        Self {
            enforce: true,
            max_age_secs,
        }
    }

    /// Policy that never rejects on age.
    pub fn disabled() -> Self {
        Self {
            enforce: false,
            ..Self::default()
        }
    }

    /// Seconds elapsed between `issued_at` and `now`. Negative if issued in the future.
    pub fn age(issued_at: i64, now: i64) -> i64 {
        now.saturating_sub(issued_at)
    }

    /// Rejects bundles older than the window when enforcement is on.
    ///
    /// Future timestamps (negative age) are accepted.
    pub fn check(&self, issued_at: i64, now: i64) -> Result<(), ValidationError> {
        if !self.enforce {
            return Ok(());
        }
        let age_secs = Self::age(issued_at, now);
        if age_secs > 0 && age_secs as u64 > self.max_age_secs {
            return Err(ValidationError::Stale {
                age_secs,
                max_age_secs: self.max_age_secs,
            });
        }
        Ok(())
    }
}

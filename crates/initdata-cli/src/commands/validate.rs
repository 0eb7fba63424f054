//! Validate command implementation.

use initdata_canonical::SignaturePolicy;
use initdata_core::{FreshnessPolicy, ValidationOutcome, Validator};
use serde_json::json;

use crate::input::{load_config, read_bundle};
use crate::output;

pub struct Options {
    pub skip_freshness: bool,
    pub max_age: Option<u64>,
    pub exclude_signature: bool,
    pub json: bool,
}

pub fn run(
    credential: Option<String>,
    input: Option<String>,
    options: Options,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(credential)?;
    if let Some(max_age) = options.max_age {
        config.freshness = FreshnessPolicy::with_max_age(max_age);
    }
    if options.skip_freshness {
        config.freshness.enforce = false;
    }
    if options.exclude_signature {
        config.signature_policy = SignaturePolicy::Exclude;
    }

    let init_data = read_bundle(input)?;
    if init_data.is_empty() {
        return Err("initData is empty".into());
    }

    let validator = Validator::new(config);
    let outcome = validator.validate(&init_data);

    if options.json {
        let value = match &outcome {
            ValidationOutcome::Valid { profile, issued_at } => json!({
                "valid": true,
                "user": profile,
                "auth_date": issued_at,
            }),
            ValidationOutcome::Invalid {
                reason,
                diagnostics,
            } => json!({
                "valid": false,
                "reason": reason.code(),
                "error": reason.to_string(),
                "diagnostics": diagnostics,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", output::format_outcome(&outcome));
    }

    if !outcome.is_valid() {
        std::process::exit(1);
    }
    Ok(())
}

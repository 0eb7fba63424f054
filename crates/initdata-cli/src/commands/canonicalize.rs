//! Canonicalize command implementation.

use initdata_canonical::{Canonicalizer, ParameterSet, SignaturePolicy};
use initdata_core::config::signature_policy_from_env;

use crate::input::read_bundle;

pub fn run(
    input: Option<String>,
    exclude_signature: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let init_data = read_bundle(input)?;
    let policy = if exclude_signature {
        SignaturePolicy::Exclude
    } else {
        signature_policy_from_env()?.unwrap_or_default()
    };

    let canonical = Canonicalizer::new(policy).canonicalize(&ParameterSet::parse(&init_data));
    println!("{}", canonical);
    Ok(())
}

//! Bundle and configuration loading shared by commands.

use initdata_core::{ConfigError, ValidatorConfig};
use std::io::{self, Read};

/// Reads a bundle from a file or stdin, trimming surrounding whitespace.
pub fn read_bundle(input: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    let raw = if let Some(path) = input {
        std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read file {}: {}", path, e))?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };
    let bundle = raw.trim().to_string();
    tracing::debug!(bytes = bundle.len(), "read initData");
    Ok(bundle)
}

/// `--credential` wins over `INITDATA_CREDENTIAL`; every other setting comes
/// from the environment either way.
pub fn load_config(credential: Option<String>) -> Result<ValidatorConfig, ConfigError> {
    match credential {
        Some(c) if !c.trim().is_empty() => ValidatorConfig::new(c).apply_env(),
        Some(_) => Err(ConfigError::MissingCredential("--credential")),
        None => ValidatorConfig::from_env(),
    }
}

//! Generate command implementation.

use initdata_canonical::SignaturePolicy;
use initdata_core::{GenerateRequest, Generator, UserProfile};
use serde_json::json;

use crate::input::load_config;

pub struct Options {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
    pub photo_url: Option<String>,
    pub allows_write_to_pm: bool,
    pub query_id: Option<String>,
    pub chat_instance: Option<String>,
    pub chat_type: Option<String>,
    pub signature: Option<String>,
    pub exclude_signature: bool,
    pub json: bool,
}

pub fn run(
    credential: Option<String>,
    options: Options,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(credential)?;
    if options.exclude_signature {
        config.signature_policy = SignaturePolicy::Exclude;
    }

    let mut profile = UserProfile::new(options.id, options.first_name);
    profile.last_name = options.last_name;
    profile.username = options.username;
    profile.language_code = options.language_code;
    profile.photo_url = options.photo_url;
    if options.allows_write_to_pm {
        profile.allows_write_to_pm = Some(true);
    }

    let request = GenerateRequest {
        profile,
        query_id: options.query_id,
        chat_instance: options.chat_instance,
        chat_type: options.chat_type,
        signature: options.signature,
    };
    let bundle = Generator::new(&config).generate(&request);

    if options.json {
        let value = json!({
            "init_data": bundle.init_data,
            "auth_date": bundle.issued_at,
            "hash": bundle.digest.to_hex(),
            "data_check_string": bundle.canonical.as_str(),
            "user": request.profile,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", bundle.init_data);
    }
    Ok(())
}

use hmac::{Hmac, Mac};
use initdata_canonical::{encode_component, SignaturePolicy};
use initdata_core::{
    FreshnessPolicy, GenerateRequest, Generator, UserProfile, ValidationError, ValidationOutcome,
    Validator, ValidatorConfig,
};
use proptest::prelude::*;
use sha2::Sha256;

const CREDENTIAL: &str = "123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11";
const NOW: i64 = 1_700_000_000;

fn make_validator() -> Validator {
    Validator::new(ValidatorConfig::new(CREDENTIAL))
}

fn sign(credential: &str, canonical: &str) -> String {
    sign_with_domain("WebAppData", credential, canonical)
}

fn sign_with_domain(domain: &str, credential: &str, canonical: &str) -> String {
    let mut outer = Hmac::<Sha256>::new_from_slice(domain.as_bytes()).unwrap();
    outer.update(credential.as_bytes());
    let secret = outer.finalize().into_bytes();
    let mut inner = Hmac::<Sha256>::new_from_slice(&secret).unwrap();
    inner.update(canonical.as_bytes());
    hex::encode(inner.finalize().into_bytes())
}

fn full_profile() -> UserProfile {
    UserProfile::new(123456789, "John")
        .with_last_name("Doe")
        .with_username("johndoe")
        .with_photo_url("https://t.me/i/userpic/320/johndoe.jpg")
}

#[test]
fn concrete_vector_is_accepted() {
    let canonical = "auth_date=1700000000\nuser={\"id\":1,\"first_name\":\"A\"}";
    let digest = sign("123:ABC", canonical);
    let init_data = format!(
        "auth_date=1700000000&user={}&hash={}",
        encode_component(r#"{"id":1,"first_name":"A"}"#),
        digest
    );

    let validator = Validator::new(ValidatorConfig::new("123:ABC"));
    assert_eq!(
        validator.validate_at(&init_data, NOW + 10),
        ValidationOutcome::Valid {
            profile: UserProfile::new(1, "A"),
            issued_at: 1_700_000_000,
        }
    );
}

#[test]
fn injected_domain_constant_keys_the_secret() {
    const DOMAIN: &str = "WEBAPPDATA-DOMAIN-CONST";
    let user = r#"{"id":1,"first_name":"A"}"#;
    let digest = sign_with_domain(
        DOMAIN,
        "123:ABC",
        &format!("auth_date=1700000000\nuser={}", user),
    );
    let init_data = format!(
        "auth_date=1700000000&user={}&hash={}",
        encode_component(user),
        digest
    );

    let custom = Validator::new(ValidatorConfig::new("123:ABC").with_domain_constant(DOMAIN));
    assert_eq!(
        custom.validate_at(&init_data, NOW),
        ValidationOutcome::Valid {
            profile: UserProfile::new(1, "A"),
            issued_at: 1_700_000_000,
        }
    );

    let platform = Validator::new(ValidatorConfig::new("123:ABC"));
    assert!(matches!(
        platform.validate_at(&init_data, NOW).reason(),
        Some(ValidationError::DigestMismatch { .. })
    ));
}

#[test]
fn generator_honours_custom_domain_constant() {
    let config = ValidatorConfig::new(CREDENTIAL).with_domain_constant("OtherData");
    let request = GenerateRequest::new(full_profile()).with_query_id("AAGUoaYh");
    let bundle = Generator::new(&config).generate_at(&request, NOW);

    assert_eq!(
        bundle.digest.to_hex(),
        sign_with_domain("OtherData", CREDENTIAL, bundle.canonical.as_str())
    );
    assert!(Validator::new(config).validate_at(&bundle.init_data, NOW).is_valid());
    assert_eq!(
        make_validator().validate_at(&bundle.init_data, NOW).reason().map(|r| r.code()),
        Some("digest_mismatch")
    );
}

#[test]
fn round_trip_with_all_auxiliary_fields() {
    let validator = make_validator();
    let request = GenerateRequest::new(full_profile())
        .with_query_id("AAGUoaYhAAAAAJShpiECLdLG")
        .with_chat_instance("-6996832993589169568")
        .with_chat_type("private");
    let bundle = validator.generator().generate_at(&request, NOW);

    let accepted = validator
        .validate_at(&bundle.init_data, NOW)
        .into_result()
        .unwrap();
    assert_eq!(accepted.profile, full_profile());
    assert_eq!(accepted.issued_at, NOW);
}

#[test]
fn round_trip_with_signature_field() {
    let signature =
        "ZUtslzNDdOS_KXALnJyEHdnzyH4F3_Bl0s9B6XR77hoUMDYgpVz9hlgXSSaErtg_TMOjr1zw0Czii1xQjK98BQ";
    for policy in [SignaturePolicy::Include, SignaturePolicy::Exclude] {
        let config = ValidatorConfig::new(CREDENTIAL).with_signature_policy(policy);
        let request = GenerateRequest::new(UserProfile::new(564568468, "Ivan"))
            .with_query_id("AAGUoaYhAAAAAJShpiFcmzGg")
            .with_signature(signature);
        let bundle = Generator::new(&config).generate_at(&request, NOW);
        assert!(Validator::new(config).validate_at(&bundle.init_data, NOW).is_valid());
    }
}

#[test]
fn signature_policy_mismatch_breaks_the_digest() {
    let request = GenerateRequest::new(UserProfile::new(1, "A")).with_signature("sig");
    let bundle = Generator::new(&ValidatorConfig::new(CREDENTIAL)).generate_at(&request, NOW);

    let excluding = Validator::new(
        ValidatorConfig::new(CREDENTIAL).with_signature_policy(SignaturePolicy::Exclude),
    );
    assert_eq!(
        excluding.validate_at(&bundle.init_data, NOW).reason().map(|r| r.code()),
        Some("digest_mismatch")
    );
}

#[test]
fn wrong_credential_is_a_mismatch() {
    let bundle = make_validator()
        .generator()
        .generate_at(&GenerateRequest::new(UserProfile::new(1, "A")), NOW);
    let other = Validator::new(ValidatorConfig::new("654321:other"));
    assert!(matches!(
        other.validate_at(&bundle.init_data, NOW).reason(),
        Some(ValidationError::DigestMismatch { .. })
    ));
}

#[test]
fn credential_whitespace_does_not_matter() {
    let bundle = Validator::new(ValidatorConfig::new(format!("  {}\n", CREDENTIAL)))
        .generator()
        .generate_at(&GenerateRequest::new(UserProfile::new(1, "A")), NOW);
    assert!(make_validator().validate_at(&bundle.init_data, NOW).is_valid());
}

#[test]
fn missing_digest() {
    let init_data = format!(
        "auth_date={}&user={}",
        NOW,
        encode_component(r#"{"id":1,"first_name":"A"}"#)
    );
    assert_eq!(
        make_validator().validate_at(&init_data, NOW).reason(),
        Some(&ValidationError::MissingDigest)
    );
}

#[test]
fn staleness_and_bypass() {
    let request = GenerateRequest::new(UserProfile::new(1, "A"));
    let bundle = make_validator().generator().generate_at(&request, NOW - 90_000);

    let enforced = make_validator().validate_at(&bundle.init_data, NOW);
    assert_eq!(
        enforced.reason(),
        Some(&ValidationError::Stale {
            age_secs: 90_000,
            max_age_secs: 86_400
        })
    );

    let relaxed = Validator::new(
        ValidatorConfig::new(CREDENTIAL).with_freshness(FreshnessPolicy::disabled()),
    );
    assert_eq!(
        relaxed.validate_at(&bundle.init_data, NOW),
        ValidationOutcome::Valid {
            profile: UserProfile::new(1, "A"),
            issued_at: NOW - 90_000,
        }
    );
}

#[test]
fn bypass_still_runs_digest_check() {
    let relaxed = Validator::new(
        ValidatorConfig::new(CREDENTIAL).with_freshness(FreshnessPolicy::disabled()),
    );
    let outcome = relaxed.validate_at("auth_date=1&hash=00", NOW);
    assert_eq!(outcome.reason().map(|r| r.code()), Some("digest_mismatch"));
}

#[test]
fn signed_bundle_without_timestamp() {
    let user = r#"{"id":1,"first_name":"A"}"#;
    let digest = sign(CREDENTIAL, &format!("user={}", user));
    let init_data = format!("user={}&hash={}", encode_component(user), digest);
    assert_eq!(
        make_validator().validate_at(&init_data, NOW).reason(),
        Some(&ValidationError::MissingOrMalformedTimestamp { raw: None })
    );
}

#[test]
fn signed_bundle_with_malformed_timestamp() {
    let digest = sign(CREDENTIAL, "auth_date=yesterday");
    let init_data = format!("auth_date=yesterday&hash={}", digest);
    assert_eq!(
        make_validator().validate_at(&init_data, NOW).reason(),
        Some(&ValidationError::MissingOrMalformedTimestamp {
            raw: Some("yesterday".to_string())
        })
    );
}

#[test]
fn signed_bundle_without_user() {
    let digest = sign(CREDENTIAL, &format!("auth_date={}", NOW));
    let init_data = format!("auth_date={}&hash={}", NOW, digest);
    assert_eq!(
        make_validator().validate_at(&init_data, NOW).reason(),
        Some(&ValidationError::MissingProfile)
    );
}

#[test]
fn signed_bundle_with_incomplete_user() {
    let user = r#"{"id":1}"#;
    let digest = sign(CREDENTIAL, &format!("auth_date={}\nuser={}", NOW, user));
    let init_data = format!("auth_date={}&user={}&hash={}", NOW, encode_component(user), digest);
    assert!(matches!(
        make_validator().validate_at(&init_data, NOW).reason(),
        Some(ValidationError::MalformedProfile(_))
    ));
}

#[test]
fn uppercase_digest_is_accepted() {
    let validator = make_validator();
    let bundle = validator
        .generator()
        .generate_at(&GenerateRequest::new(UserProfile::new(1, "A")), NOW);
    let upper = bundle
        .init_data
        .replace(&bundle.digest.to_hex(), &bundle.digest.to_hex().to_uppercase());
    assert!(validator.validate_at(&upper, NOW).is_valid());
}

#[test]
fn malformed_pairs_are_tolerated() {
    let validator = make_validator();
    let bundle = validator
        .generator()
        .generate_at(&GenerateRequest::new(UserProfile::new(1, "A")), NOW);
    let noisy = format!("junk&{}&&", bundle.init_data);
    assert!(validator.validate_at(&noisy, NOW).is_valid());
}

#[test]
fn diagnostics_serialize_as_a_map() {
    let failure = make_validator()
        .validate_at("auth_date=1&hash=00", NOW)
        .into_result()
        .unwrap_err();
    let value = serde_json::to_value(&failure.diagnostics).unwrap();
    assert_eq!(value["credential_id"], "123456");
    assert_eq!(value["parsed_fields"], serde_json::json!(["auth_date", "hash"]));
    assert_eq!(value["digest_matches"], false);
    assert!(value.get("issued_at").is_none());
    assert!(!value.to_string().contains("ABC-DEF1234"));
}

fn profile_strategy() -> impl Strategy<Value = UserProfile> {
    (
        any::<i64>(),
        "\\PC{1,16}",
        proptest::option::of("\\PC{0,16}"),
        proptest::option::of("[a-z0-9_]{5,32}"),
        proptest::option::of("[a-z]{2}"),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(id, first, last, username, lang, allows)| UserProfile {
            id,
            first_name: first,
            last_name: last,
            username,
            language_code: lang,
            photo_url: None,
            allows_write_to_pm: allows,
        })
}

proptest! {
    #[test]
    fn generated_bundles_round_trip(
        profile in profile_strategy(),
        query_id in proptest::option::of("[A-Za-z0-9_-]{8,24}"),
        age in 0i64..=86_400,
    ) {
        let validator = make_validator();
        let mut request = GenerateRequest::new(profile.clone());
        request.query_id = query_id;
        let bundle = validator.generator().generate_at(&request, NOW - age);

        prop_assert_eq!(
            validator.validate_at(&bundle.init_data, NOW),
            ValidationOutcome::Valid { profile, issued_at: NOW - age }
        );
    }

    #[test]
    fn flipping_a_signed_character_is_detected(
        profile in profile_strategy(),
        position in any::<prop::sample::Index>(),
    ) {
        let validator = make_validator();
        let bundle = validator
            .generator()
            .generate_at(&GenerateRequest::new(profile), NOW);
        let (signed, hash) = bundle.init_data.split_at(bundle.init_data.rfind("&hash=").unwrap());

        // Only positions inside values, so the field set stays fixed.
        let candidates: Vec<usize> = signed
            .char_indices()
            .filter(|(i, c)| {
                c.is_ascii_alphanumeric() && signed[..*i].rfind('=') > signed[..*i].rfind('&')
            })
            .map(|(i, _)| i)
            .collect();
        prop_assume!(!candidates.is_empty());
        let at = candidates[position.index(candidates.len())];

        let original = signed.as_bytes()[at];
        let flipped = if original == b'0' { b'1' } else { b'0' };
        let mut bytes = signed.as_bytes().to_vec();
        bytes[at] = flipped;
        let tampered = format!("{}{}", String::from_utf8(bytes).unwrap(), hash);

        let outcome = validator.validate_at(&tampered, NOW);
        prop_assert!(
            matches!(outcome.reason(), Some(ValidationError::DigestMismatch { .. })),
            "tampered bundle was not rejected: {}",
            tampered
        );
    }
}

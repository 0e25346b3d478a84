//! End-to-end generation and validation through the auth handler

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use keyroll_jwt::{
    Algorithm, AuthHandler, CodecResult, Config, Credentials, DecodedToken, GeneratorError,
    JwsCodec, KeySize, SignOptions, TokenCodec, ValidatorError, generate_credentials,
    hash_refresh_token, verify_refresh_token,
};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn handler() -> AuthHandler {
    AuthHandler::new(&Config::default())
}

fn es256() -> Credentials {
    generate_credentials(Algorithm::ES256, None).unwrap()
}

/// Sign arbitrary claims with `credentials` outside the generator
fn sign_raw(credentials: &Credentials, algorithm: Algorithm, claims: Value) -> String {
    JwsCodec::new()
        .sign(
            claims,
            credentials.private_key(),
            &SignOptions {
                algorithm,
                expires_in: 3600,
                key_id: None,
            },
        )
        .unwrap()
}

#[test]
fn rotation_scenario_keeps_old_tokens_valid() {
    let auth = handler();
    auth.register(es256());

    let first = auth
        .generate_access_token(&json!({ "userId": 123, "role": "admin" }))
        .unwrap();
    assert_eq!(
        auth.verify_and_decode_token(&first).unwrap(),
        json!({ "userId": 123, "role": "admin" })
    );

    auth.register(es256());
    assert_eq!(
        auth.verify_and_decode_token(&first).unwrap(),
        json!({ "userId": 123, "role": "admin" })
    );

    let second = auth.generate_access_token(&json!({ "userId": 789 })).unwrap();
    assert_eq!(auth.verify_and_decode_token(&second).unwrap(), json!({ "userId": 789 }));
}

#[test]
fn tokens_name_their_signing_credential() {
    let auth = handler();
    let credentials = es256();
    let id = credentials.id().to_string();
    auth.register(credentials);

    let token = auth.generate_access_token("hello").unwrap();
    let decoded = JwsCodec::new().decode(&token).unwrap();
    assert_eq!(decoded.header.kid.as_deref(), Some(id.as_str()));
    assert_eq!(decoded.header.typ, "JWT");
    assert_eq!(decoded.payload["credentials_id"], json!(id));
    assert_eq!(decoded.payload["data"], json!("hello"));
}

#[test]
fn evicted_credential_reports_expiry() {
    let auth = AuthHandler::new(&Config::default().with_credentials_limit(2));
    auth.register(es256());
    let token = auth.generate_access_token(&json!({ "userId": 1 })).unwrap();

    auth.register(es256());
    assert!(auth.verify_and_decode_token(&token).is_ok());

    auth.register(es256());
    assert_eq!(
        auth.verify_and_decode_token(&token),
        Err(ValidatorError::TokenExpired)
    );
}

#[test]
fn non_positive_expiry_yields_expired_tokens() {
    for seconds in [0, -30] {
        let config = Config::default().with_access_token_expiry(Duration::seconds(seconds));
        let auth = AuthHandler::new(&config);
        auth.register(es256());

        let token = auth.generate_access_token(&json!({ "userId": 1 })).unwrap();
        assert_eq!(
            auth.verify_and_decode_token(&token),
            Err(ValidatorError::TokenExpired)
        );
    }
}

#[test]
fn generation_without_credentials_is_invalid_key() {
    let auth = handler();
    let err = auth.generate_access_token(&json!({})).unwrap_err();
    assert!(matches!(err, GeneratorError::InvalidKey(_)));
    assert_eq!(err.code(), "JWTInvalidKey");
}

#[test]
fn refresh_tokens_carry_hashed_secret() {
    let auth = handler();
    auth.register(es256());

    let first = auth.generate_refresh_token().unwrap();
    let second = auth.generate_refresh_token().unwrap();

    assert_eq!(first.token.len(), 128);
    assert_eq!(hash_refresh_token(&first.token), first.hashed_token);
    assert_eq!(hash_refresh_token(&first.token), hash_refresh_token(&first.token));
    assert!(verify_refresh_token(&first.token, &first.hashed_token));
    assert_ne!(*first.token, *second.token);

    let data = auth.verify_and_decode_token(&first.jwt).unwrap();
    assert_eq!(data, json!(first.token.as_str()));
}

#[test]
fn refresh_tokens_use_refresh_expiry() {
    let config = Config::default().with_refresh_token_expiry(Duration::days(1));
    let auth = AuthHandler::new(&config);
    auth.register(es256());

    let refresh = auth.generate_refresh_token().unwrap();
    let claims = JwsCodec::new().decode(&refresh.jwt).unwrap().payload;
    let lifetime = claims["exp"].as_i64().unwrap() - claims["iat"].as_i64().unwrap();
    assert_eq!(lifetime, 86_400);
}

#[test]
fn every_algorithm_round_trips() {
    let cases = [
        (Algorithm::RS256, Some(KeySize::Low)),
        (Algorithm::PS256, Some(KeySize::Low)),
        (Algorithm::RS512, Some(KeySize::Low)),
        (Algorithm::ES384, None),
        (Algorithm::ES512, None),
    ];
    for (algorithm, size) in cases {
        let auth = handler();
        auth.register(generate_credentials(algorithm, size).unwrap());

        let token = auth.generate_access_token(&json!({ "alg": algorithm.as_str() })).unwrap();
        assert_eq!(
            auth.verify_and_decode_token(&token).unwrap(),
            json!({ "alg": algorithm.as_str() }),
            "{algorithm}"
        );
    }
}

#[test]
fn tampered_payload_is_invalid_token() {
    let auth = handler();
    let credentials = es256();
    let id = credentials.id().to_string();
    auth.register(credentials);

    let token = auth.generate_access_token(&json!({ "role": "user" })).unwrap();
    let mut parts: Vec<&str> = token.split('.').collect();
    let forged = URL_SAFE_NO_PAD.encode(
        json!({
            "data": { "role": "admin" },
            "credentials_id": id,
            "exp": Utc::now().timestamp() + 3600,
        })
        .to_string(),
    );
    parts[1] = &forged;

    assert_eq!(
        auth.verify_and_decode_token(&parts.join(".")),
        Err(ValidatorError::InvalidToken)
    );
}

#[test]
fn mismatched_public_key_is_invalid_token() {
    let auth = handler();
    let (a, b) = (es256(), es256());
    auth.register(Credentials::new(Algorithm::ES256, a.private_key(), b.public_key()));

    let token = auth.generate_access_token(&json!({ "userId": 1 })).unwrap();
    assert_eq!(
        auth.verify_and_decode_token(&token),
        Err(ValidatorError::InvalidToken)
    );
}

#[test]
fn unusable_public_key_is_invalid_secret_or_key() {
    let auth = handler();
    let good = es256();
    auth.register(Credentials::new(
        Algorithm::ES256,
        good.private_key(),
        "-----BEGIN PUBLIC KEY-----\nbm90IGEga2V5\n-----END PUBLIC KEY-----\n",
    ));

    let token = auth.generate_access_token(&json!({ "userId": 1 })).unwrap();
    let err = auth.verify_and_decode_token(&token).unwrap_err();
    assert_eq!(err, ValidatorError::InvalidSecretOrKey);
    assert_eq!(err.code(), "JWTInvalidSecretOrKey");
}

#[test]
fn unusable_private_key_is_invalid_key() {
    let auth = handler();
    auth.register(Credentials::new(Algorithm::ES256, "not a pem", "not a pem"));
    assert!(matches!(
        auth.generate_access_token(&json!({})),
        Err(GeneratorError::InvalidKey(_))
    ));
}

#[test]
fn algorithm_must_match_credential() {
    let auth = handler();
    let es384 = generate_credentials(Algorithm::ES384, None).unwrap();
    let id = es384.id().to_string();
    auth.register(es384);

    let token = sign_raw(
        &es256(),
        Algorithm::ES256,
        json!({ "data": 1, "credentials_id": id }),
    );
    assert_eq!(
        auth.verify_and_decode_token(&token),
        Err(ValidatorError::InvalidAlgorithm)
    );
}

#[test]
fn future_not_before_is_not_active() {
    let auth = handler();
    let credentials = es256();
    let id = credentials.id().to_string();
    let token = sign_raw(
        &credentials,
        Algorithm::ES256,
        json!({
            "data": 1,
            "credentials_id": id,
            "nbf": Utc::now().timestamp() + 600,
        }),
    );
    auth.register(credentials);

    assert_eq!(
        auth.verify_and_decode_token(&token),
        Err(ValidatorError::TokenNotActive)
    );
}

#[test]
fn verified_claims_without_data_are_malformed() {
    let auth = handler();
    let credentials = es256();
    let id = credentials.id().to_string();
    let missing = sign_raw(&credentials, Algorithm::ES256, json!({ "credentials_id": id }));
    auth.register(credentials);

    assert_eq!(
        auth.verify_and_decode_token(&missing),
        Err(ValidatorError::InvalidTokenStructure)
    );
    assert_eq!(
        auth.decode_token(&missing),
        Err(ValidatorError::InvalidTokenStructure)
    );
}

#[test]
fn null_payloads_round_trip() {
    let auth = handler();
    auth.register(es256());

    let unit = auth.generate_access_token(&()).unwrap();
    assert_eq!(auth.verify_and_decode_token(&unit), Ok(Value::Null));

    let none = auth.generate_access_token(&None::<u32>).unwrap();
    assert_eq!(auth.verify_and_decode_token(&none), Ok(Value::Null));
    assert_eq!(auth.verify_and_decode_token_as::<Option<u32>>(&none), Ok(None));
    assert_eq!(auth.decode_token(&none), Ok(Value::Null));
}

#[test]
fn missing_credentials_id_is_malformed() {
    let auth = handler();
    let credentials = es256();
    let token = sign_raw(&credentials, Algorithm::ES256, json!({ "data": 1 }));
    let empty = sign_raw(
        &credentials,
        Algorithm::ES256,
        json!({ "data": 1, "credentials_id": "" }),
    );
    auth.register(credentials);

    assert_eq!(
        auth.verify_and_decode_token(&token),
        Err(ValidatorError::InvalidTokenStructure)
    );
    assert_eq!(
        auth.verify_and_decode_token(&empty),
        Err(ValidatorError::InvalidTokenStructure)
    );
}

#[test]
fn decode_requires_credentials_id() {
    let auth = handler();
    let credentials = es256();
    let anonymous = sign_raw(
        &credentials,
        Algorithm::ES256,
        json!({ "data": { "admin": true } }),
    );
    let empty = sign_raw(
        &credentials,
        Algorithm::ES256,
        json!({ "data": { "admin": true }, "credentials_id": "" }),
    );
    auth.register(credentials);

    for token in [anonymous, empty] {
        assert_eq!(
            auth.decode_token(&token),
            Err(ValidatorError::InvalidTokenStructure)
        );
        assert_eq!(
            auth.validator().decode_as::<Value>(&token),
            Err(ValidatorError::InvalidTokenStructure)
        );
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Session {
    user_id: u64,
    role: String,
}

#[test]
fn typed_payloads_round_trip() {
    let auth = handler();
    auth.register(es256());

    let session = Session {
        user_id: 42,
        role: "editor".to_string(),
    };
    let token = auth.generate_access_token(&session).unwrap();
    assert_eq!(auth.verify_and_decode_token_as::<Session>(&token).unwrap(), session);
    assert_eq!(auth.validator().decode_as::<Session>(&token).unwrap(), session);
    assert_eq!(
        auth.verify_and_decode_token_as::<Vec<String>>(&token),
        Err(ValidatorError::InvalidTokenStructure)
    );
}

#[test]
fn decode_skips_verification() {
    let auth = handler();
    auth.register(es256());
    let token = auth.generate_access_token(&json!({ "userId": 5 })).unwrap();

    let stranger = handler();
    assert_eq!(stranger.decode_token(&token).unwrap(), json!({ "userId": 5 }));
    assert_eq!(
        stranger.verify_and_decode_token(&token),
        Err(ValidatorError::TokenExpired)
    );
}

struct CountingCodec {
    inner: JwsCodec,
    signed: Arc<AtomicUsize>,
    verified: Arc<AtomicUsize>,
}

impl TokenCodec for CountingCodec {
    fn sign(&self, claims: Value, private_key: &str, options: &SignOptions) -> CodecResult<String> {
        self.signed.fetch_add(1, Ordering::SeqCst);
        self.inner.sign(claims, private_key, options)
    }

    fn decode(&self, token: &str) -> Option<DecodedToken> {
        self.inner.decode(token)
    }

    fn verify(&self, token: &str, public_key: &str, algorithms: &[Algorithm]) -> CodecResult<Value> {
        self.verified.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(token, public_key, algorithms)
    }
}

#[test]
fn custom_codec_is_used_for_both_directions() {
    let signed = Arc::new(AtomicUsize::new(0));
    let verified = Arc::new(AtomicUsize::new(0));
    let auth = AuthHandler::with_codec(
        &Config::default(),
        CountingCodec {
            inner: JwsCodec::new(),
            signed: Arc::clone(&signed),
            verified: Arc::clone(&verified),
        },
    );
    auth.register(es256());

    let token = auth.generate_access_token(&json!(1)).unwrap();
    auth.verify_and_decode_token(&token).unwrap();
    auth.generate_refresh_token().unwrap();

    assert_eq!(signed.load(Ordering::SeqCst), 2);
    assert_eq!(verified.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_validation_leaves_store_untouched() {
    let auth = handler();
    auth.register(es256());
    let before = auth.store().ids();

    let _ = auth.verify_and_decode_token("a.b.c");
    let _ = auth.verify_and_decode_token("");
    assert_eq!(auth.store().ids(), before);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn arbitrary_strings_are_not_tokens(input in "\\PC*") {
        let auth = handler();
        prop_assert_eq!(
            auth.verify_and_decode_token(&input),
            Err(ValidatorError::InvalidTokenStructure)
        );
    }
}

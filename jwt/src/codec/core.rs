//! Compact JWS framing for the default codec

use chrono::Duration;
use serde_json::Value;

use super::utils::{
    base64_url_decode, base64_url_encode, decode_segment, now, require_pem, split_token,
    validate_time_claims,
};
use super::{ecdsa, rsa};
use crate::{
    error::{CodecError, CodecResult},
    traits::{DecodedToken, SignOptions, TokenCodec},
    types::{Algorithm, JwtHeader, KeyFamily},
};

/// Default [`TokenCodec`]: compact JWS over RSA and ECDSA.
///
/// Tokens are `base64url(header).base64url(claims).base64url(signature)`.
#[derive(Debug, Clone, Default)]
pub struct JwsCodec {
    leeway: i64,
}

impl JwsCodec {
    /// Codec with no clock skew allowance
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `leeway` of clock skew when checking `exp` and `nbf`
    #[must_use]
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway.num_seconds().max(0);
        self
    }

    fn sign_input(algorithm: Algorithm, message: &[u8], private_key: &str) -> CodecResult<Vec<u8>> {
        match algorithm.family() {
            KeyFamily::Ecdsa => ecdsa::sign(algorithm, message, private_key),
            KeyFamily::Rsa => rsa::sign(algorithm, message, private_key),
        }
    }

    fn verify_input(
        algorithm: Algorithm,
        message: &[u8],
        signature: &[u8],
        public_key: &str,
    ) -> CodecResult<()> {
        match algorithm.family() {
            KeyFamily::Ecdsa => ecdsa::verify(algorithm, message, signature, public_key),
            KeyFamily::Rsa => rsa::verify(algorithm, message, signature, public_key),
        }
    }
}

impl TokenCodec for JwsCodec {
    fn sign(&self, claims: Value, private_key: &str, options: &SignOptions) -> CodecResult<String> {
        let Value::Object(mut claims) = claims else {
            return Err(CodecError::Serialization(
                "claims must be a JSON object".to_string(),
            ));
        };

        let issued_at = now();
        let expires_at = issued_at
            .checked_add(options.expires_in)
            .ok_or(CodecError::ExpiryOutOfRange)?;
        claims.insert("iat".to_string(), Value::from(issued_at));
        claims.insert("exp".to_string(), Value::from(expires_at));

        let mut header = JwtHeader::new(options.algorithm);
        if let Some(kid) = &options.key_id {
            header = header.with_key_id(kid.clone());
        }

        let header_json =
            serde_json::to_vec(&header).map_err(|e| CodecError::Serialization(e.to_string()))?;
        let claims_json =
            serde_json::to_vec(&claims).map_err(|e| CodecError::Serialization(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            base64_url_encode(&header_json),
            base64_url_encode(&claims_json)
        );
        let signature = Self::sign_input(options.algorithm, signing_input.as_bytes(), private_key)?;

        Ok(format!("{signing_input}.{}", base64_url_encode(&signature)))
    }

    fn decode(&self, token: &str) -> Option<DecodedToken> {
        let segments = split_token(token).ok()?;
        let header: JwtHeader = decode_segment(segments.header, "header").ok()?;
        let payload: Value = decode_segment(segments.payload, "payload").ok()?;
        Some(DecodedToken { header, payload })
    }

    fn verify(&self, token: &str, public_key: &str, algorithms: &[Algorithm]) -> CodecResult<Value> {
        let segments = split_token(token)?;
        let header: JwtHeader = decode_segment(segments.header, "header")?;
        require_pem(public_key)?;

        let algorithm: Algorithm = header.alg.parse()?;
        if !algorithms.contains(&algorithm) {
            return Err(CodecError::InvalidAlgorithm(header.alg));
        }

        let signature = base64_url_decode(segments.signature)
            .map_err(|_| CodecError::malformed("invalid signature encoding"))?;
        Self::verify_input(
            algorithm,
            segments.signing_input.as_bytes(),
            &signature,
            public_key,
        )?;

        let claims: Value = decode_segment(segments.payload, "payload")?;
        validate_time_claims(&claims, now(), self.leeway)?;

        Ok(claims)
    }
}

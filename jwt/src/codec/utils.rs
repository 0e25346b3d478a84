//! Codec helpers - base64url framing, signature plumbing and time claims

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use serde_json::Value;

use crate::error::{CodecError, CodecResult};

/// Base64 URL-safe encoding without padding (RFC 7515)
#[inline]
pub(crate) fn base64_url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Base64 URL-safe decoding without padding (RFC 7515)
#[inline]
pub(crate) fn base64_url_decode(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(input)
}

/// Current unix time in seconds
#[inline]
pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// The three segments of a compact JWS.
pub(crate) struct Segments<'a> {
    pub(crate) header: &'a str,
    pub(crate) payload: &'a str,
    pub(crate) signature: &'a str,
    /// `header.payload`, the bytes covered by the signature
    pub(crate) signing_input: &'a str,
}

/// Split a compact token into its segments. The signature may be empty.
pub(crate) fn split_token(token: &str) -> CodecResult<Segments<'_>> {
    let mut parts = token.splitn(4, '.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(CodecError::malformed("token must have three segments"));
    };
    if header.is_empty() || payload.is_empty() {
        return Err(CodecError::malformed("empty header or payload segment"));
    }

    Ok(Segments {
        header,
        payload,
        signature,
        signing_input: &token[..header.len() + 1 + payload.len()],
    })
}

/// Decode one base64url segment as JSON
pub(crate) fn decode_segment<T: serde::de::DeserializeOwned>(
    segment: &str,
    what: &str,
) -> CodecResult<T> {
    let bytes = base64_url_decode(segment)
        .map_err(|_| CodecError::Malformed(format!("invalid {what} encoding")))?;
    serde_json::from_slice(&bytes).map_err(|_| CodecError::Malformed(format!("invalid {what} JSON")))
}

/// Key material must be non-empty before any parsing is attempted
#[inline]
pub(crate) fn require_pem(pem: &str) -> CodecResult<&str> {
    let pem = pem.trim();
    if pem.is_empty() {
        return Err(CodecError::MissingKey);
    }
    Ok(pem)
}

/// Sign `message` and return the raw signature bytes
pub(crate) fn sign_with<S, K>(key: &K, message: &[u8]) -> CodecResult<Vec<u8>>
where
    S: SignatureEncoding,
    K: Signer<S>,
{
    key.try_sign(message)
        .map(|signature| signature.to_vec())
        .map_err(|e| CodecError::signing(&e.to_string()))
}

/// Check raw signature bytes against `message`
pub(crate) fn verify_with<S, K>(key: &K, message: &[u8], signature: &[u8]) -> CodecResult<()>
where
    S: for<'a> TryFrom<&'a [u8]>,
    K: Verifier<S>,
{
    let signature = S::try_from(signature).map_err(|_| CodecError::InvalidSignature)?;
    key.verify(message, &signature)
        .map_err(|_| CodecError::InvalidSignature)
}

fn numeric_claim(claims: &Value, name: &str) -> CodecResult<Option<i64>> {
    match claims.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .or_else(|| value.as_f64().map(|secs| secs as i64))
            .map(Some)
            .ok_or_else(|| CodecError::Malformed(format!("invalid {name} value"))),
    }
}

/// Enforce `exp` and `nbf` against `now`, allowing `leeway` seconds of skew
pub(crate) fn validate_time_claims(claims: &Value, now: i64, leeway: i64) -> CodecResult<()> {
    if let Some(exp) = numeric_claim(claims, "exp")? {
        if now >= exp.saturating_add(leeway) {
            return Err(CodecError::Expired);
        }
    }

    if let Some(nbf) = numeric_claim(claims, "nbf")? {
        if nbf > now.saturating_add(leeway) {
            return Err(CodecError::NotBefore);
        }
    }

    Ok(())
}

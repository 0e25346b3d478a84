//! The token codec seam.

use serde_json::Value;

use crate::{
    error::CodecResult,
    types::{Algorithm, JwtHeader},
};

/// Options for [`TokenCodec::sign`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOptions {
    /// Algorithm to sign with
    pub algorithm: Algorithm,
    /// Lifetime in seconds; `exp = iat + expires_in`
    pub expires_in: i64,
    /// Optional `kid` header value
    pub key_id: Option<String>,
}

/// A token split into its unverified parts.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    /// Token header
    pub header: JwtHeader,
    /// Token claims, not authenticated
    pub payload: Value,
}

/// Token wire format and signature primitives.
///
/// Token generation and validation only reach cryptography through this
/// trait. Implementations must be thread-safe and must report failures with
/// the granularity of [`CodecError`](crate::CodecError).
pub trait TokenCodec: Send + Sync + 'static {
    /// Sign a JSON object of claims with a PEM private key.
    ///
    /// The codec stamps `iat` and `exp` itself.
    fn sign(&self, claims: Value, private_key: &str, options: &SignOptions) -> CodecResult<String>;

    /// Split a token without checking its signature.
    ///
    /// Returns `None` when the token is not structurally decodable.
    fn decode(&self, token: &str) -> Option<DecodedToken>;

    /// Verify a token's signature with a PEM public key and return its claims.
    ///
    /// The token's own algorithm must be one of `algorithms`.
    fn verify(&self, token: &str, public_key: &str, algorithms: &[Algorithm]) -> CodecResult<Value>;
}

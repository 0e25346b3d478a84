//! Credential key material checks

use serde_json::json;

use crate::{
    codec::JwsCodec,
    error::CodecResult,
    traits::{SignOptions, TokenCodec},
    types::Credentials,
};

/// Check that a credential's keys parse for its algorithm and form a pair.
///
/// Signs and verifies a short-lived check token. Registration does not call
/// this; run it on externally supplied key material before registering.
///
/// # Errors
/// - [`CodecError::MissingKey`](crate::CodecError::MissingKey) for empty key material
/// - [`CodecError::InvalidKey`](crate::CodecError::InvalidKey) when a key does not parse
/// - [`CodecError::InvalidSignature`](crate::CodecError::InvalidSignature) when the
///   public key does not match the private key
pub fn validate_credentials(credentials: &Credentials) -> CodecResult<()> {
    let codec = JwsCodec::new();
    let options = SignOptions {
        algorithm: credentials.algorithm(),
        expires_in: 60,
        key_id: Some(credentials.id().to_string()),
    };

    let token = codec.sign(json!({ "check": true }), credentials.private_key(), &options)?;
    codec.verify(&token, credentials.public_key(), &[credentials.algorithm()])?;
    Ok(())
}

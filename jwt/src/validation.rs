//! Token validation against the rotation window.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::{
    codec::JwsCodec,
    error::{ValidatorError, ValidatorResult},
    rotator::CredentialStore,
    traits::TokenCodec,
};

/// Claim naming the credential that signed a token
pub const CREDENTIALS_ID_CLAIM: &str = "credentials_id";

/// Claim carrying the caller's payload
pub const DATA_CLAIM: &str = "data";

/// Verifies tokens with whichever retained credential signed them.
///
/// The signing credential is looked up by the unverified `credentials_id`
/// claim; the signature is then checked with that credential's public key and
/// algorithm only.
pub struct TokenValidator<C: TokenCodec = JwsCodec> {
    store: Arc<CredentialStore>,
    codec: Arc<C>,
}

impl TokenValidator<JwsCodec> {
    /// Validator over `store` with the default codec
    #[must_use]
    pub fn new(store: Arc<CredentialStore>) -> Self {
        Self::with_codec(store, Arc::new(JwsCodec::new()))
    }
}

impl<C: TokenCodec> TokenValidator<C> {
    /// Validator over `store` with a custom codec
    #[must_use]
    pub fn with_codec(store: Arc<CredentialStore>, codec: Arc<C>) -> Self {
        Self { store, codec }
    }

    /// Verify `token` and return its `data` claim.
    ///
    /// # Errors
    /// - [`ValidatorError::InvalidTokenStructure`] when the token cannot be
    ///   decoded, has no `credentials_id`, or its verified claims lack `data`
    /// - [`ValidatorError::TokenExpired`] when the token has expired, or its
    ///   credential is no longer retained
    /// - [`ValidatorError::TokenNotActive`] when `nbf` is in the future
    /// - [`ValidatorError::InvalidAlgorithm`] when the token's algorithm is not
    ///   the credential's
    /// - [`ValidatorError::InvalidSecretOrKey`] when the credential's public key
    ///   is missing or unusable
    /// - [`ValidatorError::InvalidToken`] for any other verification failure
    pub fn verify_and_decode(&self, token: &str) -> ValidatorResult<Value> {
        let credentials_id = self.credentials_id(token)?;

        let Some(credentials) = self.store.resolve(&credentials_id) else {
            tracing::debug!(%credentials_id, "token signed by a credential outside the rotation window");
            return Err(ValidatorError::TokenExpired);
        };

        let mut claims = self
            .codec
            .verify(token, credentials.public_key(), &[credentials.algorithm()])
            .map_err(|err| {
                let mapped = ValidatorError::from(err.clone());
                tracing::warn!(
                    %credentials_id,
                    error = %err,
                    code = mapped.code(),
                    "token verification failed"
                );
                mapped
            })?;

        take_data(&mut claims)
    }

    /// Verify `token` and deserialize its `data` claim into `T`.
    ///
    /// # Errors
    /// As [`verify_and_decode`](Self::verify_and_decode); `data` that does not
    /// deserialize into `T` is [`ValidatorError::InvalidTokenStructure`].
    pub fn verify_and_decode_as<T: DeserializeOwned>(&self, token: &str) -> ValidatorResult<T> {
        let data = self.verify_and_decode(token)?;
        serde_json::from_value(data).map_err(|_| ValidatorError::InvalidTokenStructure)
    }

    /// Return the `data` claim without verifying the token.
    ///
    /// Never use the result for authorization decisions.
    ///
    /// # Errors
    /// [`ValidatorError::InvalidTokenStructure`] when the token cannot be
    /// decoded, has no `credentials_id`, or carries no `data`.
    pub fn decode(&self, token: &str) -> ValidatorResult<Value> {
        let mut payload = self.unverified_payload(token)?;
        take_data(&mut payload)
    }

    /// Deserialize the `data` claim into `T` without verifying the token.
    ///
    /// # Errors
    /// As [`decode`](Self::decode).
    pub fn decode_as<T: DeserializeOwned>(&self, token: &str) -> ValidatorResult<T> {
        let data = self.decode(token)?;
        serde_json::from_value(data).map_err(|_| ValidatorError::InvalidTokenStructure)
    }

    fn credentials_id(&self, token: &str) -> ValidatorResult<String> {
        let mut payload = self.unverified_payload(token)?;
        match payload.get_mut(CREDENTIALS_ID_CLAIM).map(Value::take) {
            Some(Value::String(id)) => Ok(id),
            _ => Err(ValidatorError::InvalidTokenStructure),
        }
    }

    /// Decoded claims of a token that names a signing credential, unverified
    fn unverified_payload(&self, token: &str) -> ValidatorResult<Value> {
        let decoded = self
            .codec
            .decode(token)
            .ok_or(ValidatorError::InvalidTokenStructure)?;

        match decoded.payload.get(CREDENTIALS_ID_CLAIM) {
            Some(Value::String(id)) if !id.is_empty() => Ok(decoded.payload),
            _ => Err(ValidatorError::InvalidTokenStructure),
        }
    }
}

impl<C: TokenCodec> Clone for TokenValidator<C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            codec: Arc::clone(&self.codec),
        }
    }
}

/// The `data` claim; an explicit `null` is a valid payload, an absent claim is not
fn take_data(claims: &mut Value) -> ValidatorResult<Value> {
    claims
        .get_mut(DATA_CLAIM)
        .map(Value::take)
        .ok_or(ValidatorError::InvalidTokenStructure)
}

//! Access and refresh token generation with the active credential.

use rand::RngCore;
use serde::Serialize;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::{
    codec::JwsCodec,
    config::{Config, TokenConfig},
    error::{GeneratorError, GeneratorResult},
    rotator::CredentialStore,
    traits::{SignOptions, TokenCodec},
    types::RefreshToken,
};

/// Random bytes in a refresh secret (hex encoded to 128 characters)
pub const REFRESH_SECRET_BYTES: usize = 64;

/// SHA-256 of a refresh secret, lowercase hex.
///
/// Deterministic, so a presented secret can be hashed and compared with the
/// stored `hashed_token`.
#[must_use]
pub fn hash_refresh_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Whether `token` hashes to `hashed_token`, compared in constant time
#[must_use]
pub fn verify_refresh_token(token: &str, hashed_token: &str) -> bool {
    hash_refresh_token(token)
        .as_bytes()
        .ct_eq(hashed_token.as_bytes())
        .into()
}

/// Signs tokens with whichever credential is active at call time.
///
/// The generator holds the store itself, not a snapshot, so a credential
/// registered between two calls signs the second token.
pub struct TokenGenerator<C: TokenCodec = JwsCodec> {
    store: Arc<CredentialStore>,
    codec: Arc<C>,
    access_token: TokenConfig,
    refresh_token: TokenConfig,
}

impl TokenGenerator<JwsCodec> {
    /// Generator over `store` with the default codec
    #[must_use]
    pub fn new(store: Arc<CredentialStore>, config: &Config) -> Self {
        Self::with_codec(store, Arc::new(JwsCodec::new()), config)
    }
}

impl<C: TokenCodec> TokenGenerator<C> {
    /// Generator over `store` with a custom codec
    #[must_use]
    pub fn with_codec(store: Arc<CredentialStore>, codec: Arc<C>, config: &Config) -> Self {
        Self {
            store,
            codec,
            access_token: config.access_token,
            refresh_token: config.refresh_token,
        }
    }

    /// Sign `data` into an access token with the active credential.
    ///
    /// # Errors
    /// - [`GeneratorError::InvalidKey`] when no credential is registered or its
    ///   private key is unusable
    /// - [`GeneratorError::InvalidAlgorithm`] when the codec rejects the algorithm
    /// - [`GeneratorError::TokenExpiredDuringSigning`] when the expiry overflows
    /// - [`GeneratorError::SignError`] for any other failure, including `data`
    ///   that cannot be serialized
    pub fn generate_access_token<T>(&self, data: &T) -> GeneratorResult<String>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_value(data).map_err(|e| GeneratorError::SignError(e.to_string()))?;
        self.sign(data, self.access_token)
    }

    /// Create a fresh refresh secret and sign it with the active credential.
    ///
    /// # Errors
    /// Same as [`generate_access_token`](Self::generate_access_token).
    pub fn generate_refresh_token(&self) -> GeneratorResult<RefreshToken> {
        let mut bytes = Zeroizing::new([0u8; REFRESH_SECRET_BYTES]);
        rand::rng().fill_bytes(bytes.as_mut());
        let token = Zeroizing::new(hex::encode(bytes.as_ref()));
        let hashed_token = hash_refresh_token(&token);

        let jwt = self.sign(Value::String(token.to_string()), self.refresh_token)?;

        Ok(RefreshToken {
            jwt,
            token,
            hashed_token,
        })
    }

    fn sign(&self, data: Value, config: TokenConfig) -> GeneratorResult<String> {
        let credentials = self
            .store
            .active()
            .ok_or_else(|| GeneratorError::invalid_key("no active credentials registered"))?;

        let claims = json!({
            "data": data,
            "credentials_id": credentials.id(),
        });
        let options = SignOptions {
            algorithm: credentials.algorithm(),
            expires_in: config.expiry,
            key_id: Some(credentials.id().to_string()),
        };

        self.codec
            .sign(claims, credentials.private_key(), &options)
            .map(|token| {
                tracing::debug!(
                    credentials_id = credentials.id(),
                    algorithm = %credentials.algorithm(),
                    "signed token"
                );
                token
            })
            .map_err(|err| {
                tracing::warn!(
                    credentials_id = credentials.id(),
                    algorithm = %credentials.algorithm(),
                    error = %err,
                    "token signing failed"
                );
                GeneratorError::from(err)
            })
    }
}

impl<C: TokenCodec> Clone for TokenGenerator<C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            codec: Arc::clone(&self.codec),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_hash_is_sha256_hex() {
        assert_eq!(
            hash_refresh_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn refresh_hash_comparison() {
        let hashed = hash_refresh_token("secret");
        assert!(verify_refresh_token("secret", &hashed));
        assert!(!verify_refresh_token("secret2", &hashed));
        assert!(!verify_refresh_token("secret", "short"));
    }

    #[test]
    fn empty_store_has_no_signing_key() {
        let generator = TokenGenerator::new(Arc::new(CredentialStore::default()), &Config::default());
        assert!(matches!(
            generator.generate_access_token(&json!({ "userId": 1 })),
            Err(GeneratorError::InvalidKey(_))
        ));
        assert!(matches!(
            generator.generate_refresh_token(),
            Err(GeneratorError::InvalidKey(_))
        ));
    }
}

//! Authentication handler wiring one store to a generator and a validator

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::{
    codec::JwsCodec,
    config::Config,
    error::{GeneratorResult, ValidatorResult},
    generator::TokenGenerator,
    rotator::CredentialStore,
    traits::TokenCodec,
    types::{Credentials, RefreshToken},
    validation::TokenValidator,
};

/// Token authentication over a rotating set of signing credentials.
///
/// Owns one [`CredentialStore`] sized from [`Config::credentials_limit`] and
/// shares it between a [`TokenGenerator`] and a [`TokenValidator`]. Cloning
/// the handler shares the same store.
///
/// ```no_run
/// use keyroll_jwt::{Algorithm, AuthHandler, Config, generate_credentials};
/// use serde_json::json;
///
/// let auth = AuthHandler::new(&Config::default());
/// auth.register(generate_credentials(Algorithm::ES256, None)?);
///
/// let token = auth.generate_access_token(&json!({ "userId": 123 }))?;
/// assert_eq!(auth.verify_and_decode_token(&token)?, json!({ "userId": 123 }));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct AuthHandler<C: TokenCodec = JwsCodec> {
    store: Arc<CredentialStore>,
    generator: TokenGenerator<C>,
    validator: TokenValidator<C>,
}

impl AuthHandler<JwsCodec> {
    /// Handler using the default codec
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_codec(config, JwsCodec::new())
    }
}

impl<C: TokenCodec> AuthHandler<C> {
    /// Handler using a custom codec
    #[must_use]
    pub fn with_codec(config: &Config, codec: C) -> Self {
        let store = Arc::new(CredentialStore::with_limit(config.credentials_limit()));
        let codec = Arc::new(codec);
        Self {
            generator: TokenGenerator::with_codec(Arc::clone(&store), Arc::clone(&codec), config),
            validator: TokenValidator::with_codec(Arc::clone(&store), codec),
            store,
        }
    }

    /// Shared credential store
    #[must_use]
    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Register a credential as the new signer; returns the evicted id, if any
    pub fn register(&self, credentials: Credentials) -> Option<String> {
        self.store.register(credentials)
    }

    /// See [`TokenGenerator::generate_access_token`].
    ///
    /// # Errors
    /// Propagates [`GeneratorError`](crate::GeneratorError).
    pub fn generate_access_token<T>(&self, data: &T) -> GeneratorResult<String>
    where
        T: Serialize + ?Sized,
    {
        self.generator.generate_access_token(data)
    }

    /// See [`TokenGenerator::generate_refresh_token`].
    ///
    /// # Errors
    /// Propagates [`GeneratorError`](crate::GeneratorError).
    pub fn generate_refresh_token(&self) -> GeneratorResult<RefreshToken> {
        self.generator.generate_refresh_token()
    }

    /// See [`TokenValidator::verify_and_decode`].
    ///
    /// # Errors
    /// Propagates [`ValidatorError`](crate::ValidatorError).
    pub fn verify_and_decode_token(&self, token: &str) -> ValidatorResult<Value> {
        self.validator.verify_and_decode(token)
    }

    /// See [`TokenValidator::verify_and_decode_as`].
    ///
    /// # Errors
    /// Propagates [`ValidatorError`](crate::ValidatorError).
    pub fn verify_and_decode_token_as<T: DeserializeOwned>(&self, token: &str) -> ValidatorResult<T> {
        self.validator.verify_and_decode_as(token)
    }

    /// See [`TokenValidator::decode`]. The result is not authenticated.
    ///
    /// # Errors
    /// Propagates [`ValidatorError`](crate::ValidatorError).
    pub fn decode_token(&self, token: &str) -> ValidatorResult<Value> {
        self.validator.decode(token)
    }

    /// Token generator sharing this handler's store
    #[must_use]
    pub fn generator(&self) -> &TokenGenerator<C> {
        &self.generator
    }

    /// Token validator sharing this handler's store
    #[must_use]
    pub fn validator(&self) -> &TokenValidator<C> {
        &self.validator
    }
}

impl<C: TokenCodec> Clone for AuthHandler<C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            generator: self.generator.clone(),
            validator: self.validator.clone(),
        }
    }
}

impl<C: TokenCodec> std::fmt::Debug for AuthHandler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthHandler")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

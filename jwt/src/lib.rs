//! Signed access and refresh tokens over a bounded window of rotating
//! signing credentials.
//!
//! - [`CredentialStore`] keeps the most recent `limit` credentials; the newest
//!   one signs, any resident one verifies
//! - [`TokenGenerator`] signs access tokens and refresh tokens carrying a
//!   random secret and its SHA-256 hash
//! - [`TokenValidator`] finds the signing credential from the token's
//!   `credentials_id` claim and verifies with that credential only
//! - [`AuthHandler`] wires the three together from one [`Config`]
//!
//! Signatures are RSA (PKCS#1 v1.5 and PSS) or ECDSA (P-256, P-384, P-521)
//! through the [`TokenCodec`] seam; [`JwsCodec`] is the default.

mod algorithms;
mod codec;
mod config;
mod error;
mod generator;
mod handler;
mod keys;
mod rotation;
mod rotator;
mod traits;
mod types;
mod validation;

pub use algorithms::{KeySize, generate_credentials, generate_credentials_id};
pub use codec::JwsCodec;
pub use config::{
    Config, DEFAULT_ACCESS_TOKEN_EXPIRY, DEFAULT_CREDENTIALS_LIMIT, DEFAULT_REFRESH_TOKEN_EXPIRY,
    TokenConfig,
};
pub use error::*;
pub use generator::{REFRESH_SECRET_BYTES, TokenGenerator, hash_refresh_token, verify_refresh_token};
pub use handler::AuthHandler;
pub use keys::validate_credentials;
pub use rotator::CredentialStore;
pub use traits::{DecodedToken, SignOptions, TokenCodec};
pub use types::{Algorithm, Credentials, JwtHeader, KeyFamily, RefreshToken};
pub use validation::{CREDENTIALS_ID_CLAIM, DATA_CLAIM, TokenValidator};

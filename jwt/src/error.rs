//! Error taxonomy for token generation, validation and the codec boundary.

use thiserror::Error;

/// Result of a token generation operation
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Result of a token validation operation
pub type ValidatorResult<T> = Result<T, ValidatorError>;

/// Result of a codec operation
pub type CodecResult<T> = Result<T, CodecError>;

/// Result of a credential generation operation
pub type CredentialsResult<T> = Result<T, CredentialsError>;

/// Failures raised while signing access or refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// The signing primitive rejected the credential's algorithm
    #[error("invalid signing algorithm: {0}")]
    InvalidAlgorithm(String),
    /// No active credential, or its private key is missing or unusable
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
    /// The configured expiry cannot be represented as an `exp` claim
    #[error("token expiry is out of range")]
    TokenExpiredDuringSigning,
    /// Any other signing failure
    #[error("token signing failed: {0}")]
    SignError(String),
}

impl GeneratorError {
    /// Stable machine-readable code for this error
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            GeneratorError::InvalidAlgorithm(_) => "JWTInvalidAlgorithm",
            GeneratorError::InvalidKey(_) => "JWTInvalidKey",
            GeneratorError::TokenExpiredDuringSigning => "JWTExpiredToken",
            GeneratorError::SignError(_) => "JWTSignError",
        }
    }

    /// Create an invalid key error
    #[inline]
    #[must_use]
    pub fn invalid_key(msg: &str) -> Self {
        GeneratorError::InvalidKey(msg.to_string())
    }

    /// Create a signing error
    #[inline]
    #[must_use]
    pub fn sign_error(msg: &str) -> Self {
        GeneratorError::SignError(msg.to_string())
    }
}

impl From<CodecError> for GeneratorError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::InvalidAlgorithm(alg) => GeneratorError::InvalidAlgorithm(alg),
            CodecError::MissingKey => GeneratorError::invalid_key("private key must have a value"),
            CodecError::InvalidKey(msg) => GeneratorError::InvalidKey(msg),
            CodecError::ExpiryOutOfRange => GeneratorError::TokenExpiredDuringSigning,
            other => GeneratorError::SignError(other.to_string()),
        }
    }
}

/// Failures raised while decoding or verifying a token.
///
/// Variants carry no detail on purpose: callers branch on the kind, and the
/// reason is reported through `tracing` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidatorError {
    /// Signature or framing rejected for a reason not covered below
    #[error("invalid token")]
    InvalidToken,
    /// Token is not decodable, or lacks `credentials_id` or `data`
    #[error("invalid token structure")]
    InvalidTokenStructure,
    /// Token `exp` has passed, or its signing credential has left the
    /// rotation window. The two cases are deliberately reported the same way.
    #[error("token expired")]
    TokenExpired,
    /// Token `nbf` is still in the future
    #[error("token not active yet")]
    TokenNotActive,
    /// Token algorithm does not match the signing credential's algorithm
    #[error("invalid token algorithm")]
    InvalidAlgorithm,
    /// Signing credential's public key is missing or was rejected
    #[error("invalid secret or public key")]
    InvalidSecretOrKey,
}

impl ValidatorError {
    /// Stable machine-readable code for this error
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ValidatorError::InvalidToken => "JWTInvalidToken",
            ValidatorError::InvalidTokenStructure => "InvalidTokenStructure",
            ValidatorError::TokenExpired => "JWTTokenExpired",
            ValidatorError::TokenNotActive => "JWTTokenNotActive",
            ValidatorError::InvalidAlgorithm => "JWTInvalidAlgorithm",
            ValidatorError::InvalidSecretOrKey => "JWTInvalidSecretOrKey",
        }
    }
}

impl From<CodecError> for ValidatorError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::InvalidAlgorithm(_) => ValidatorError::InvalidAlgorithm,
            CodecError::MissingKey | CodecError::InvalidKey(_) => {
                ValidatorError::InvalidSecretOrKey
            }
            CodecError::Expired => ValidatorError::TokenExpired,
            CodecError::NotBefore => ValidatorError::TokenNotActive,
            _ => ValidatorError::InvalidToken,
        }
    }
}

/// Failures reported by a [`TokenCodec`](crate::TokenCodec).
///
/// Any substitute codec must report at least this granularity, since token
/// generation and validation translate these kinds into their own taxonomies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Token is not three base64url segments of valid JSON
    #[error("malformed token: {0}")]
    Malformed(String),
    /// Token `exp` has passed
    #[error("token expired")]
    Expired,
    /// Token `nbf` is in the future
    #[error("token not yet valid")]
    NotBefore,
    /// Algorithm unknown, or not among the allowed algorithms
    #[error("invalid algorithm: {0}")]
    InvalidAlgorithm(String),
    /// Empty key material
    #[error("secret or key must have a value")]
    MissingKey,
    /// Key material could not be parsed for the algorithm
    #[error("invalid key: {0}")]
    InvalidKey(String),
    /// Signature does not match
    #[error("invalid signature")]
    InvalidSignature,
    /// `iat + expires_in` overflows
    #[error("expiry out of range")]
    ExpiryOutOfRange,
    /// Claims could not be serialized
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Signing primitive failed
    #[error("signing error: {0}")]
    Signing(String),
}

impl CodecError {
    /// Create a malformed token error
    #[inline]
    #[must_use]
    pub fn malformed(msg: &str) -> Self {
        CodecError::Malformed(msg.to_string())
    }

    /// Create an invalid key error
    #[inline]
    #[must_use]
    pub fn invalid_key(msg: &str) -> Self {
        CodecError::InvalidKey(msg.to_string())
    }

    /// Create a signing error
    #[inline]
    #[must_use]
    pub fn signing(msg: &str) -> Self {
        CodecError::Signing(msg.to_string())
    }
}

/// Failures raised while generating credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsError {
    /// Key size does not match the ECDSA curve implied by the algorithm
    #[error("invalid key size for algorithm {algorithm}, please use {expected}")]
    InvalidKeySize {
        /// Requested algorithm
        algorithm: String,
        /// Key size the algorithm requires
        expected: String,
    },
    /// Key-pair generation or PEM encoding failed
    #[error("key generation failed: {0}")]
    KeyGeneration(String),
}

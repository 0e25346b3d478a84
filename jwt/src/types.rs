//! Credential, header and token type definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::error::CodecError;

/// Asymmetric signing algorithms a credential can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// ECDSA using P-256 and SHA-256
    ES256,
    /// ECDSA using P-384 and SHA-384
    ES384,
    /// ECDSA using P-521 and SHA-512
    ES512,
    /// RSASSA-PSS using SHA-256
    PS256,
    /// RSASSA-PSS using SHA-384
    PS384,
    /// RSASSA-PSS using SHA-512
    PS512,
    /// RSASSA-PKCS1-v1_5 using SHA-256
    RS256,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    RS384,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    RS512,
}

/// Key family an [`Algorithm`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    /// Elliptic curve keys
    Ecdsa,
    /// RSA keys
    Rsa,
}

impl Algorithm {
    /// Every supported algorithm
    pub const ALL: [Algorithm; 9] = [
        Algorithm::ES256,
        Algorithm::ES384,
        Algorithm::ES512,
        Algorithm::PS256,
        Algorithm::PS384,
        Algorithm::PS512,
        Algorithm::RS256,
        Algorithm::RS384,
        Algorithm::RS512,
    ];

    /// JOSE `alg` header value
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::ES256 => "ES256",
            Algorithm::ES384 => "ES384",
            Algorithm::ES512 => "ES512",
            Algorithm::PS256 => "PS256",
            Algorithm::PS384 => "PS384",
            Algorithm::PS512 => "PS512",
            Algorithm::RS256 => "RS256",
            Algorithm::RS384 => "RS384",
            Algorithm::RS512 => "RS512",
        }
    }

    /// Key family needed to sign with this algorithm
    #[must_use]
    pub fn family(self) -> KeyFamily {
        match self {
            Algorithm::ES256 | Algorithm::ES384 | Algorithm::ES512 => KeyFamily::Ecdsa,
            _ => KeyFamily::Rsa,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| CodecError::InvalidAlgorithm(s.to_string()))
    }
}

/// Signing credential: an algorithm, a matched PEM key pair and a unique id.
///
/// Credentials are immutable once built. The private key is wiped from memory
/// when the last owner drops it.
#[derive(Clone)]
pub struct Credentials {
    id: String,
    algorithm: Algorithm,
    private_key: Zeroizing<String>,
    public_key: String,
}

impl Credentials {
    /// Wrap an externally generated PEM key pair under a fresh random id
    #[must_use]
    pub fn new(
        algorithm: Algorithm,
        private_key: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        Self::with_id(
            crate::algorithms::generate_credentials_id(),
            algorithm,
            private_key,
            public_key,
        )
    }

    /// Wrap a PEM key pair under a caller-chosen id
    #[must_use]
    pub fn with_id(
        id: impl Into<String>,
        algorithm: Algorithm,
        private_key: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            algorithm,
            private_key: Zeroizing::new(private_key.into()),
            public_key: public_key.into(),
        }
    }

    /// Unique identifier embedded in every token this credential signs
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Signing algorithm
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// PEM-encoded private key
    #[must_use]
    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    /// PEM-encoded public key
    #[must_use]
    pub fn public_key(&self) -> &str {
        &self.public_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("algorithm", &self.algorithm)
            .field("private_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// JWT header structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtHeader {
    /// Signing algorithm
    pub alg: String,
    /// Token type, always `JWT` for tokens produced here
    #[serde(default = "JwtHeader::default_typ")]
    pub typ: String,
    /// Id of the signing credential
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl JwtHeader {
    /// Header for the given algorithm
    #[must_use]
    pub fn new(alg: Algorithm) -> Self {
        Self {
            alg: alg.as_str().to_string(),
            typ: Self::default_typ(),
            kid: None,
        }
    }

    /// Attach a key id
    #[must_use]
    pub fn with_key_id(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    fn default_typ() -> String {
        "JWT".to_string()
    }
}

/// A signed refresh token together with the secret it carries.
///
/// Persist `hashed_token`, hand `jwt` to the client, and discard `token`.
#[derive(Clone)]
pub struct RefreshToken {
    /// Signed token wrapping the secret
    pub jwt: String,
    /// Raw refresh secret (hex)
    pub token: Zeroizing<String>,
    /// SHA-256 of `token` (hex)
    pub hashed_token: String,
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshToken")
            .field("token", &"[REDACTED]")
            .field("hashed_token", &self.hashed_token)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_names_round_trip() {
        for alg in Algorithm::ALL {
            assert_eq!(alg.as_str().parse::<Algorithm>(), Ok(alg));
        }
        assert!(matches!(
            "HS256".parse::<Algorithm>(),
            Err(CodecError::InvalidAlgorithm(_))
        ));
    }

    #[test]
    fn debug_redacts_private_key() {
        let creds = Credentials::with_id("abc", Algorithm::ES256, "PRIVATE-PEM", "PUBLIC-PEM");
        let printed = format!("{creds:?}");
        assert!(printed.contains("abc"));
        assert!(!printed.contains("PRIVATE-PEM"));
    }
}

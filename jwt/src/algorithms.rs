//! Credential generation: RSA and ECDSA key pairs as PEM

use p256::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rand::RngCore;
use rand_core::OsRng;
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

use crate::{
    error::{CredentialsError, CredentialsResult},
    types::{Algorithm, Credentials, KeyFamily},
};

/// Strength of a generated key pair.
///
/// | size   | RSA modulus | ECDSA curve |
/// |--------|-------------|-------------|
/// | Low    | 2048 bits   | P-256       |
/// | Medium | 3072 bits   | P-384       |
/// | High   | 4096 bits   | P-521       |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySize {
    /// General use, moderate security
    Low,
    /// Balanced security and performance
    Medium,
    /// Highest security, slowest
    High,
}

impl KeySize {
    /// RSA modulus length in bits
    #[must_use]
    pub fn rsa_bits(self) -> usize {
        match self {
            KeySize::Low => 2048,
            KeySize::Medium => 3072,
            KeySize::High => 4096,
        }
    }

    /// Size an algorithm uses when none is requested. ECDSA curves fix their size.
    #[must_use]
    pub fn default_for(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::ES256 => KeySize::Low,
            Algorithm::ES384 => KeySize::Medium,
            Algorithm::ES512 => KeySize::High,
            _ => KeySize::Medium,
        }
    }
}

impl std::fmt::Display for KeySize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            KeySize::Low => "low",
            KeySize::Medium => "medium",
            KeySize::High => "high",
        })
    }
}

/// Fresh credential id: 16 random bytes as lowercase hex
#[must_use]
pub fn generate_credentials_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate credentials with a new RSA or ECDSA key pair.
///
/// RSA keys are PKCS#1 PEM, EC keys PKCS#8 (private) and SPKI (public) PEM.
/// When `key_size` is `None` RSA uses [`KeySize::Medium`] and ECDSA the size
/// its curve requires.
///
/// # Errors
/// - [`CredentialsError::InvalidKeySize`] when an ECDSA algorithm is paired
///   with a size other than its curve's (ES256 needs `Low`, ES384 `Medium`,
///   ES512 `High`)
/// - [`CredentialsError::KeyGeneration`] when key generation or PEM encoding fails
pub fn generate_credentials(
    algorithm: Algorithm,
    key_size: Option<KeySize>,
) -> CredentialsResult<Credentials> {
    let required = KeySize::default_for(algorithm);
    let key_size = match key_size {
        Some(size) if algorithm.family() == KeyFamily::Ecdsa && size != required => {
            return Err(CredentialsError::InvalidKeySize {
                algorithm: algorithm.to_string(),
                expected: required.to_string(),
            });
        }
        Some(size) => size,
        None => required,
    };

    let (private_key, public_key) = match algorithm {
        Algorithm::ES256 => ec_key_pair(p256::SecretKey::random(&mut OsRng), |s| s.public_key())?,
        Algorithm::ES384 => ec_key_pair(p384::SecretKey::random(&mut OsRng), |s| s.public_key())?,
        Algorithm::ES512 => ec_key_pair(p521::SecretKey::random(&mut OsRng), |s| s.public_key())?,
        _ => rsa_key_pair(key_size.rsa_bits())?,
    };

    let credentials = Credentials::new(algorithm, private_key, public_key);
    tracing::debug!(
        credentials_id = credentials.id(),
        %algorithm,
        %key_size,
        "generated signing credentials"
    );
    Ok(credentials)
}

fn ec_key_pair<S, P>(secret: S, public: impl FnOnce(&S) -> P) -> CredentialsResult<(String, String)>
where
    S: EncodePrivateKey,
    P: EncodePublicKey,
{
    let private_pem = secret
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| CredentialsError::KeyGeneration(format!("EC private key encoding: {e}")))?;
    let public_pem = public(&secret)
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| CredentialsError::KeyGeneration(format!("EC public key encoding: {e}")))?;
    Ok((private_pem.to_string(), public_pem))
}

fn rsa_key_pair(bits: usize) -> CredentialsResult<(String, String)> {
    let private = RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| CredentialsError::KeyGeneration(format!("RSA key generation: {e}")))?;
    let private_pem = private
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| CredentialsError::KeyGeneration(format!("RSA private key encoding: {e}")))?;
    let public_pem = RsaPublicKey::from(&private)
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| CredentialsError::KeyGeneration(format!("RSA public key encoding: {e}")))?;
    Ok((private_pem.to_string(), public_pem))
}

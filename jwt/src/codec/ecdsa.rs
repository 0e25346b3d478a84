//! ECDSA-based JWT algorithm implementations
//!
//! ES256 (P-256), ES384 (P-384) and ES512 (P-521). Signatures use the fixed
//! width `r || s` encoding JWS requires, not DER. Private keys are accepted as
//! PKCS#8 or SEC1 PEM, public keys as SPKI PEM.

use p256::pkcs8::{DecodePrivateKey, DecodePublicKey};
use p521::elliptic_curve::sec1::ToEncodedPoint;

use super::utils::{require_pem, sign_with, verify_with};
use crate::{
    error::{CodecError, CodecResult},
    types::Algorithm,
};

fn invalid_private_key(algorithm: Algorithm) -> CodecError {
    CodecError::InvalidKey(format!("Invalid EC private key for {algorithm}"))
}

fn invalid_public_key(algorithm: Algorithm) -> CodecError {
    CodecError::InvalidKey(format!("Invalid EC public key for {algorithm}"))
}

fn p256_signing_key(pem: &str) -> CodecResult<p256::ecdsa::SigningKey> {
    let secret = p256::SecretKey::from_pkcs8_pem(pem)
        .or_else(|_| p256::SecretKey::from_sec1_pem(pem))
        .map_err(|_| invalid_private_key(Algorithm::ES256))?;
    Ok(p256::ecdsa::SigningKey::from(&secret))
}

fn p384_signing_key(pem: &str) -> CodecResult<p384::ecdsa::SigningKey> {
    let secret = p384::SecretKey::from_pkcs8_pem(pem)
        .or_else(|_| p384::SecretKey::from_sec1_pem(pem))
        .map_err(|_| invalid_private_key(Algorithm::ES384))?;
    Ok(p384::ecdsa::SigningKey::from(&secret))
}

fn p521_signing_key(pem: &str) -> CodecResult<p521::ecdsa::SigningKey> {
    let secret = p521::SecretKey::from_pkcs8_pem(pem)
        .or_else(|_| p521::SecretKey::from_sec1_pem(pem))
        .map_err(|_| invalid_private_key(Algorithm::ES512))?;
    p521::ecdsa::SigningKey::from_bytes(&secret.to_bytes())
        .map_err(|_| invalid_private_key(Algorithm::ES512))
}

fn p256_verifying_key(pem: &str) -> CodecResult<p256::ecdsa::VerifyingKey> {
    let public = p256::PublicKey::from_public_key_pem(pem)
        .map_err(|_| invalid_public_key(Algorithm::ES256))?;
    Ok(p256::ecdsa::VerifyingKey::from(&public))
}

fn p384_verifying_key(pem: &str) -> CodecResult<p384::ecdsa::VerifyingKey> {
    let public = p384::PublicKey::from_public_key_pem(pem)
        .map_err(|_| invalid_public_key(Algorithm::ES384))?;
    Ok(p384::ecdsa::VerifyingKey::from(&public))
}

fn p521_verifying_key(pem: &str) -> CodecResult<p521::ecdsa::VerifyingKey> {
    let public = p521::PublicKey::from_public_key_pem(pem)
        .map_err(|_| invalid_public_key(Algorithm::ES512))?;
    p521::ecdsa::VerifyingKey::from_sec1_bytes(public.to_encoded_point(false).as_bytes())
        .map_err(|_| invalid_public_key(Algorithm::ES512))
}

/// Sign `message` with the PEM private key for an ES* algorithm
pub(crate) fn sign(algorithm: Algorithm, message: &[u8], private_key: &str) -> CodecResult<Vec<u8>> {
    let pem = require_pem(private_key)?;

    match algorithm {
        Algorithm::ES256 => {
            sign_with::<p256::ecdsa::Signature, _>(&p256_signing_key(pem)?, message)
        }
        Algorithm::ES384 => {
            sign_with::<p384::ecdsa::Signature, _>(&p384_signing_key(pem)?, message)
        }
        Algorithm::ES512 => {
            sign_with::<p521::ecdsa::Signature, _>(&p521_signing_key(pem)?, message)
        }
        other => Err(CodecError::InvalidAlgorithm(other.to_string())),
    }
}

/// Verify an ES* signature over `message` with the PEM public key
pub(crate) fn verify(
    algorithm: Algorithm,
    message: &[u8],
    signature: &[u8],
    public_key: &str,
) -> CodecResult<()> {
    let pem = require_pem(public_key)?;

    match algorithm {
        Algorithm::ES256 => verify_with::<p256::ecdsa::Signature, _>(
            &p256_verifying_key(pem)?,
            message,
            signature,
        ),
        Algorithm::ES384 => verify_with::<p384::ecdsa::Signature, _>(
            &p384_verifying_key(pem)?,
            message,
            signature,
        ),
        Algorithm::ES512 => verify_with::<p521::ecdsa::Signature, _>(
            &p521_verifying_key(pem)?,
            message,
            signature,
        ),
        other => Err(CodecError::InvalidAlgorithm(other.to_string())),
    }
}

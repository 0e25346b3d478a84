//! RSA-based JWT algorithm implementations
//!
//! RS256/RS384/RS512 sign with RSASSA-PKCS1-v1_5, PS256/PS384/PS512 with
//! RSASSA-PSS (salt length equal to the digest length). Keys are accepted as
//! PKCS#1 or PKCS#8/SPKI PEM.

use rand_core::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::signature::RandomizedSigner;
use rsa::{RsaPrivateKey, RsaPublicKey, pkcs1v15, pss};
use sha2::{Sha256, Sha384, Sha512};

use super::utils::{require_pem, sign_with, verify_with};
use crate::{
    error::{CodecError, CodecResult},
    types::Algorithm,
};

/// Parse an RSA private key from PKCS#1 or PKCS#8 PEM
pub(crate) fn parse_private_key(pem: &str) -> CodecResult<RsaPrivateKey> {
    let pem = require_pem(pem)?;
    RsaPrivateKey::from_pkcs1_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
        .map_err(|e| CodecError::InvalidKey(format!("Invalid RSA private key: {e}")))
}

/// Parse an RSA public key from PKCS#1 or SPKI PEM
pub(crate) fn parse_public_key(pem: &str) -> CodecResult<RsaPublicKey> {
    let pem = require_pem(pem)?;
    RsaPublicKey::from_pkcs1_pem(pem)
        .or_else(|_| RsaPublicKey::from_public_key_pem(pem))
        .map_err(|e| CodecError::InvalidKey(format!("Invalid RSA public key: {e}")))
}

fn sign_pss<K>(key: &K, message: &[u8]) -> CodecResult<Vec<u8>>
where
    K: RandomizedSigner<pss::Signature>,
{
    use rsa::signature::SignatureEncoding;

    key.try_sign_with_rng(&mut OsRng, message)
        .map(|signature| signature.to_vec())
        .map_err(|e| CodecError::signing(&e.to_string()))
}

/// Sign `message` with the PEM private key for an RS*/PS* algorithm
pub(crate) fn sign(algorithm: Algorithm, message: &[u8], private_key: &str) -> CodecResult<Vec<u8>> {
    let key = parse_private_key(private_key)?;

    match algorithm {
        Algorithm::RS256 => {
            sign_with::<pkcs1v15::Signature, _>(&pkcs1v15::SigningKey::<Sha256>::new(key), message)
        }
        Algorithm::RS384 => {
            sign_with::<pkcs1v15::Signature, _>(&pkcs1v15::SigningKey::<Sha384>::new(key), message)
        }
        Algorithm::RS512 => {
            sign_with::<pkcs1v15::Signature, _>(&pkcs1v15::SigningKey::<Sha512>::new(key), message)
        }
        Algorithm::PS256 => sign_pss(&pss::BlindedSigningKey::<Sha256>::new(key), message),
        Algorithm::PS384 => sign_pss(&pss::BlindedSigningKey::<Sha384>::new(key), message),
        Algorithm::PS512 => sign_pss(&pss::BlindedSigningKey::<Sha512>::new(key), message),
        other => Err(CodecError::InvalidAlgorithm(other.to_string())),
    }
}

/// Verify an RS*/PS* signature over `message` with the PEM public key
pub(crate) fn verify(
    algorithm: Algorithm,
    message: &[u8],
    signature: &[u8],
    public_key: &str,
) -> CodecResult<()> {
    let key = parse_public_key(public_key)?;

    match algorithm {
        Algorithm::RS256 => verify_with::<pkcs1v15::Signature, _>(
            &pkcs1v15::VerifyingKey::<Sha256>::new(key),
            message,
            signature,
        ),
        Algorithm::RS384 => verify_with::<pkcs1v15::Signature, _>(
            &pkcs1v15::VerifyingKey::<Sha384>::new(key),
            message,
            signature,
        ),
        Algorithm::RS512 => verify_with::<pkcs1v15::Signature, _>(
            &pkcs1v15::VerifyingKey::<Sha512>::new(key),
            message,
            signature,
        ),
        Algorithm::PS256 => verify_with::<pss::Signature, _>(
            &pss::VerifyingKey::<Sha256>::new(key),
            message,
            signature,
        ),
        Algorithm::PS384 => verify_with::<pss::Signature, _>(
            &pss::VerifyingKey::<Sha384>::new(key),
            message,
            signature,
        ),
        Algorithm::PS512 => verify_with::<pss::Signature, _>(
            &pss::VerifyingKey::<Sha512>::new(key),
            message,
            signature,
        ),
        other => Err(CodecError::InvalidAlgorithm(other.to_string())),
    }
}

//! Default token codec
//!
//! Compact JWS framing over RSA (PKCS#1 v1.5 and PSS) and ECDSA (P-256,
//! P-384, P-521) signatures.

mod core;
mod ecdsa;
mod rsa;
mod utils;

pub use self::core::JwsCodec;

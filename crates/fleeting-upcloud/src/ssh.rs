//! Public key derivation for the connector's private key.
//!
//! Accepts the formats `ssh-keygen` writes: OpenSSH, PKCS#1 RSA, SEC1 EC and
//! PKCS#8 (RSA, NIST P-256/P-384, Ed25519). Keys must be unencrypted.

use p256::elliptic_curve::sec1::ToEncodedPoint;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;
use ssh_key::public::{EcdsaPublicKey, Ed25519PublicKey, KeyData, RsaPublicKey};
use ssh_key::{Mpint, PrivateKey, PublicKey};

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("no PEM private key block found")]
    NotPem,

    #[error("unsupported private key type {0:?}")]
    Unsupported(String),

    #[error(transparent)]
    Ssh(#[from] ssh_key::Error),

    #[error(transparent)]
    Pkcs1(#[from] rsa::pkcs1::Error),

    #[error(transparent)]
    Pkcs8(#[from] rsa::pkcs8::Error),

    #[error(transparent)]
    Sec1(#[from] p256::elliptic_curve::Error),
}

/// Derive the `authorized_keys` line for a PEM-armored private key.
///
/// The comment is dropped, leaving `<algorithm> <base64>`.
pub fn authorized_key(private_key: &[u8]) -> Result<String, KeyError> {
    let pem = std::str::from_utf8(private_key).map_err(|_| KeyError::NotPem)?;

    let key_data = match pem_label(pem).ok_or(KeyError::NotPem)? {
        "OPENSSH PRIVATE KEY" => PrivateKey::from_openssh(pem)?.public_key().key_data().clone(),
        "RSA PRIVATE KEY" => rsa_key_data(&rsa::RsaPrivateKey::from_pkcs1_pem(pem)?)?,
        "EC PRIVATE KEY" => sec1_key_data(pem)?,
        "PRIVATE KEY" => pkcs8_key_data(pem)?,
        other => return Err(KeyError::Unsupported(other.to_string())),
    };

    Ok(PublicKey::new(key_data, "").to_openssh()?)
}

fn pem_label(pem: &str) -> Option<&str> {
    const BEGIN: &str = "-----BEGIN ";
    let rest = &pem[pem.find(BEGIN)? + BEGIN.len()..];
    Some(&rest[..rest.find("-----")?])
}

fn rsa_key_data(key: &rsa::RsaPrivateKey) -> Result<KeyData, KeyError> {
    Ok(KeyData::Rsa(RsaPublicKey {
        e: Mpint::from_positive_bytes(&key.e().to_bytes_be())?,
        n: Mpint::from_positive_bytes(&key.n().to_bytes_be())?,
    }))
}

fn ecdsa_key_data(sec1_point: &[u8]) -> Result<KeyData, KeyError> {
    Ok(KeyData::Ecdsa(EcdsaPublicKey::from_sec1_bytes(sec1_point)?))
}

fn sec1_key_data(pem: &str) -> Result<KeyData, KeyError> {
    if let Ok(key) = p256::SecretKey::from_sec1_pem(pem) {
        return ecdsa_key_data(key.public_key().to_encoded_point(false).as_bytes());
    }
    let key = p384::SecretKey::from_sec1_pem(pem)?;
    ecdsa_key_data(key.public_key().to_encoded_point(false).as_bytes())
}

// Each decoder rejects a foreign algorithm identifier; the last attempt's error is reported.
fn pkcs8_key_data(pem: &str) -> Result<KeyData, KeyError> {
    if let Ok(key) = rsa::RsaPrivateKey::from_pkcs8_pem(pem) {
        return rsa_key_data(&key);
    }
    if let Ok(key) = p256::SecretKey::from_pkcs8_pem(pem) {
        return ecdsa_key_data(key.public_key().to_encoded_point(false).as_bytes());
    }
    if let Ok(key) = p384::SecretKey::from_pkcs8_pem(pem) {
        return ecdsa_key_data(key.public_key().to_encoded_point(false).as_bytes());
    }
    let key = ed25519_dalek::SigningKey::from_pkcs8_pem(pem)?;
    Ok(KeyData::Ed25519(Ed25519PublicKey(key.verifying_key().to_bytes())))
}

use base64::{engine::general_purpose::STANDARD as Base64, Engine as _};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::error::{AppError, AppResult};

const VERSION_PREFIX: &str = "v1:";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;
const PBKDF2_ITERATIONS: u32 = 120_000;

/// One-way password hash: PBKDF2-HMAC-SHA256 over a fresh random salt,
/// stored as `v1:<base64(salt || key)>`.
pub fn hash_password(plaintext: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let key = derive_key(plaintext.as_bytes(), &salt);

    let mut payload = Vec::with_capacity(SALT_LEN + KEY_LEN);
    payload.extend_from_slice(&salt);
    payload.extend_from_slice(&key);

    format!("{VERSION_PREFIX}{}", Base64.encode(payload))
}

pub fn verify_password(plaintext: &str, stored: &str) -> AppResult<bool> {
    let encoded = stored
        .strip_prefix(VERSION_PREFIX)
        .ok_or_else(|| AppError::other("formato de hash de senha não suportado"))?;

    let decoded = Base64
        .decode(encoded.as_bytes())
        .map_err(|_| AppError::other("hash de senha corrompido"))?;

    if decoded.len() != SALT_LEN + KEY_LEN {
        return Err(AppError::other("hash de senha com tamanho inválido"));
    }

    let (salt, expected) = decoded.split_at(SALT_LEN);
    let key = derive_key(plaintext.as_bytes(), salt);
    Ok(key.as_slice() == expected)
}

fn derive_key(password: &[u8], salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, &mut key);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let stored = hash_password("segredo-123");
        assert!(verify_password("segredo-123", &stored).unwrap());
        assert!(!verify_password("segredo-124", &stored).unwrap());
    }

    #[test]
    fn hashing_is_salted() {
        let first = hash_password("mesma-senha");
        let second = hash_password("mesma-senha");
        assert_ne!(first, second);
    }

    #[test]
    fn verify_rejects_unknown_format() {
        let result = verify_password("qualquer", "v2:abc");
        assert!(result.is_err());
    }
}

//! AES-256-GCM encryption of tenant provider tokens
//!
//! Stored form is `iv_hex:tag_hex:data_hex` with a 12-byte IV and a 16-byte
//! authentication tag.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::domain::DomainError;

const KEY_LEN: usize = 32;
const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[derive(Clone)]
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl fmt::Debug for SecretCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretCipher").finish_non_exhaustive()
    }
}

impl SecretCipher {
    /// Builds a cipher from a 64-character hex key (32 bytes)
    pub fn from_hex_key(hex_key: &str) -> Result<Self, DomainError> {
        let key = hex::decode(hex_key.trim()).map_err(|_| {
            DomainError::configuration("Encryption key must be hex encoded")
        })?;

        if key.len() != KEY_LEN {
            return Err(DomainError::configuration(format!(
                "Encryption key must be {} hex characters, got {}",
                KEY_LEN * 2,
                hex_key.trim().len()
            )));
        }

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| DomainError::configuration(format!("Invalid encryption key: {}", e)))?;

        Ok(Self { cipher })
    }

    /// Generates a fresh random key, hex encoded
    pub fn generate_hex_key() -> String {
        let mut key = [0u8; KEY_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut key);
        hex::encode(key)
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, DomainError> {
        let mut iv = [0u8; IV_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut iv);

        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
            .map_err(|e| DomainError::secret(format!("Encryption failed: {}", e)))?;

        // aes-gcm appends the tag to the ciphertext
        let (data, tag) = sealed.split_at(sealed.len() - TAG_LEN);

        Ok(format!("{}:{}:{}", hex::encode(iv), hex::encode(tag), hex::encode(data)))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String, DomainError> {
        let mut parts = encoded.trim().splitn(3, ':');

        let (Some(iv), Some(tag), Some(data)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(DomainError::secret(
                "Ciphertext must have the form iv:tag:data",
            ));
        };

        let iv = decode_part(iv, "IV")?;
        let tag = decode_part(tag, "tag")?;
        let mut sealed = decode_part(data, "data")?;

        if iv.len() != IV_LEN || tag.len() != TAG_LEN {
            return Err(DomainError::secret(format!(
                "Expected {}-byte IV and {}-byte tag",
                IV_LEN, TAG_LEN
            )));
        }

        sealed.extend_from_slice(&tag);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&iv), sealed.as_slice())
            .map_err(|_| DomainError::secret("Authentication tag mismatch"))?;

        String::from_utf8(plaintext)
            .map_err(|_| DomainError::secret("Decrypted token is not valid UTF-8"))
    }
}

fn decode_part(part: &str, name: &str) -> Result<Vec<u8>, DomainError> {
    hex::decode(part).map_err(|_| DomainError::secret(format!("Ciphertext {} is not hex", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    #[test]
    fn test_encrypt_decrypt() {
        let cipher = SecretCipher::from_hex_key(KEY).unwrap();
        let encrypted = cipher.encrypt("auth-token-123").unwrap();

        assert_eq!(encrypted.split(':').count(), 3);
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), "auth-token-123");
    }

    #[test]
    fn test_ciphertext_layout() {
        let cipher = SecretCipher::from_hex_key(KEY).unwrap();
        let encrypted = cipher.encrypt("abcd").unwrap();
        let parts: Vec<&str> = encrypted.split(':').collect();

        assert_eq!(parts[0].len(), IV_LEN * 2);
        assert_eq!(parts[1].len(), TAG_LEN * 2);
        assert_eq!(parts[2].len(), 8);
    }

    #[test]
    fn test_fresh_iv_per_encryption() {
        let cipher = SecretCipher::from_hex_key(KEY).unwrap();
        assert_ne!(cipher.encrypt("same").unwrap(), cipher.encrypt("same").unwrap());
    }

    #[test]
    fn test_wrong_key_fails() {
        let encrypted = SecretCipher::from_hex_key(KEY).unwrap().encrypt("token").unwrap();
        let other = SecretCipher::from_hex_key(&SecretCipher::generate_hex_key()).unwrap();

        assert!(matches!(other.decrypt(&encrypted), Err(DomainError::Secret { .. })));
    }

    #[test]
    fn test_tampered_tag_fails() {
        let cipher = SecretCipher::from_hex_key(KEY).unwrap();
        let encrypted = cipher.encrypt("token").unwrap();
        let mut parts: Vec<String> = encrypted.split(':').map(str::to_string).collect();
        parts[1] = "00".repeat(TAG_LEN);

        assert!(cipher.decrypt(&parts.join(":")).is_err());
    }

    #[test]
    fn test_malformed_ciphertext() {
        let cipher = SecretCipher::from_hex_key(KEY).unwrap();

        assert!(cipher.decrypt("plain-token").is_err());
        assert!(cipher.decrypt("zz:yy:xx").is_err());
        assert!(cipher.decrypt("00:00:00").is_err());
    }

    #[test]
    fn test_rejects_bad_keys() {
        assert!(matches!(
            SecretCipher::from_hex_key("abcd"),
            Err(DomainError::Configuration { .. })
        ));
        assert!(SecretCipher::from_hex_key(&"g".repeat(64)).is_err());
    }
}

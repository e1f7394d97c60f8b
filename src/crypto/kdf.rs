//! Scrypt key derivation for secret-based encryption.

use crate::config::{scrypt_params, KdfParams};
use crate::error::{Error, Result};
use rand::RngCore;
use zeroize::Zeroizing;

/// Salt bytes fed to scrypt.
pub type Salt = [u8; scrypt_params::SALT_LENGTH];

/// Key derivation using scrypt.
#[derive(Debug, Clone)]
pub struct KeyDerivation {
    salt: Salt,
    params: KdfParams,
}

impl KeyDerivation {
    /// Create a new KDF with a random salt.
    pub fn new(params: KdfParams) -> Self {
        let mut salt = [0u8; scrypt_params::SALT_LENGTH];
        rand::thread_rng().fill_bytes(&mut salt);
        Self { salt, params }
    }

    /// Create a KDF from an existing salt (for decryption).
    pub fn from_salt(salt: Salt, params: KdfParams) -> Self {
        Self { salt, params }
    }

    /// Get the salt for storage.
    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    /// Derive a 256-bit key from a secret.
    pub fn derive_key(&self, secret: &str) -> Result<Zeroizing<[u8; 32]>> {
        let params = scrypt::Params::new(
            self.params.log_n,
            self.params.r,
            self.params.p,
            scrypt_params::OUTPUT_LENGTH,
        )
        .map_err(|e| Error::KeyDerivation(e.to_string()))?;

        let mut key = Zeroizing::new([0u8; scrypt_params::OUTPUT_LENGTH]);
        scrypt::scrypt(secret.as_bytes(), &self.salt, &params, &mut key[..])
            .map_err(|e| Error::KeyDerivation(e.to_string()))?;

        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> KdfParams {
        KdfParams::new(4, 8, 1)
    }

    #[test]
    fn test_key_derivation_deterministic() {
        let kdf = KeyDerivation::from_salt([1u8; 16], cheap());

        let key1 = kdf.derive_key("password123").unwrap();
        let key2 = kdf.derive_key("password123").unwrap();

        assert_eq!(*key1, *key2);
    }

    #[test]
    fn test_different_secrets_different_keys() {
        let kdf = KeyDerivation::from_salt([2u8; 16], cheap());

        let key1 = kdf.derive_key("password1").unwrap();
        let key2 = kdf.derive_key("password2").unwrap();

        assert_ne!(*key1, *key2);
    }

    #[test]
    fn test_different_salts_different_keys() {
        let key1 = KeyDerivation::from_salt([1u8; 16], cheap())
            .derive_key("password")
            .unwrap();
        let key2 = KeyDerivation::from_salt([2u8; 16], cheap())
            .derive_key("password")
            .unwrap();

        assert_ne!(*key1, *key2);
    }

    #[test]
    fn test_new_generates_random_salt() {
        let kdf1 = KeyDerivation::new(cheap());
        let kdf2 = KeyDerivation::new(cheap());

        assert_ne!(kdf1.salt(), kdf2.salt());
    }

    #[test]
    fn test_known_vector() {
        // RFC 7914 section 12, second vector: N=1024, r=8, p=16, truncated to 32 bytes.
        let params = scrypt::Params::new(10, 8, 16, 32).unwrap();
        let mut out = [0u8; 32];
        scrypt::scrypt(b"password", b"NaCl", &params, &mut out).unwrap();
        assert_eq!(
            hex::encode(out),
            "fdbabe1c9d3472007856e7190d01e9fe7c6ad7cbc8237830e77376634b373162"
        );
    }
}

//! AES-256-GCM authenticated encryption.

use crate::error::{Error, Result};
use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use rand::RngCore;

/// Nonce size for AES-GCM (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Authentication tag size (128 bits).
pub const TAG_SIZE: usize = 16;

/// Output of one encryption: the nonce used, the ciphertext and its detached tag.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_SIZE],
}

/// AES-256-GCM cipher wrapper.
pub struct Cipher {
    cipher: Aes256Gcm,
}

impl Cipher {
    /// Create a new cipher from a derived key.
    pub fn new(key: &[u8; 32]) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
        Self { cipher }
    }

    /// Encrypt data with a random nonce.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Sealed> {
        let mut nonce = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);

        let mut ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce[..]), plaintext)
            .map_err(|e| Error::Encryption(e.to_string()))?;

        // aes-gcm appends the tag; split it off so it can be stored as its own field
        let tag_start = ciphertext
            .len()
            .checked_sub(TAG_SIZE)
            .ok_or_else(|| Error::Encryption("ciphertext shorter than tag".to_string()))?;
        let tag_bytes = ciphertext.split_off(tag_start);
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&tag_bytes);

        Ok(Sealed {
            nonce,
            ciphertext,
            tag,
        })
    }

    /// Decrypt and verify data that was encrypted with `encrypt`.
    pub fn decrypt(
        &self,
        nonce: &[u8; NONCE_SIZE],
        ciphertext: &[u8],
        tag: &[u8; TAG_SIZE],
    ) -> Result<Vec<u8>> {
        let mut combined = Vec::with_capacity(ciphertext.len() + TAG_SIZE);
        combined.extend_from_slice(ciphertext);
        combined.extend_from_slice(tag);

        self.cipher
            .decrypt(Nonce::from_slice(&nonce[..]), combined.as_slice())
            .map_err(|_| Error::Decryption)
    }
}

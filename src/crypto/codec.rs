//! Secret-based sealing of plaintext into envelopes.

use crate::config::KdfParams;
use crate::crypto::cipher::Cipher;
use crate::crypto::envelope::Envelope;
use crate::crypto::kdf::KeyDerivation;
use crate::error::Result;
use zeroize::Zeroizing;

/// Seals and opens envelopes under one shared secret.
///
/// Every `seal` draws a fresh salt and nonce, so the derived key differs per
/// envelope even though the secret is fixed.
#[derive(Clone)]
pub struct Codec {
    secret: Zeroizing<String>,
    params: KdfParams,
}

impl Codec {
    pub fn new(secret: impl Into<String>, params: KdfParams) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            params,
        }
    }

    pub fn params(&self) -> KdfParams {
        self.params
    }

    /// Encrypt `plaintext` into a serialized envelope.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String> {
        let kdf = KeyDerivation::new(self.params);
        let key = kdf.derive_key(&self.secret)?;
        let sealed = Cipher::new(&key).encrypt(plaintext)?;

        let envelope = Envelope {
            salt: *kdf.salt(),
            iv: sealed.nonce,
            ciphertext: sealed.ciphertext,
            tag: sealed.tag,
        };
        Ok(envelope.to_string())
    }

    /// Parse, authenticate and decrypt a serialized envelope.
    pub fn open(&self, envelope: &str) -> Result<Vec<u8>> {
        let envelope: Envelope = envelope.parse()?;
        let key = KeyDerivation::from_salt(envelope.salt, self.params).derive_key(&self.secret)?;
        Cipher::new(&key).decrypt(&envelope.iv, &envelope.ciphertext, &envelope.tag)
    }
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("secret", &"<redacted>")
            .field("params", &self.params)
            .finish()
    }
}

/// Seal `plaintext` under `secret` with the default scrypt cost.
pub fn seal(plaintext: &str, secret: &str) -> Result<String> {
    Codec::new(secret, KdfParams::default()).seal(plaintext.as_bytes())
}

/// Open an envelope produced by [`seal`].
pub fn open(envelope: &str, secret: &str) -> Result<String> {
    let bytes = Codec::new(secret, KdfParams::default()).open(envelope)?;
    String::from_utf8(bytes).map_err(|_| crate::error::Error::Decryption)
}

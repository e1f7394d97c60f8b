//! The serialized form of one encrypted payload.
//!
//! An envelope is four hex fields joined by colons:
//!
//! ```text
//! salt(16) : iv(12) : ciphertext(n) : tag(16)
//! ```

use crate::config::scrypt_params;
use crate::crypto::cipher::{NONCE_SIZE, TAG_SIZE};
use crate::crypto::kdf::Salt;
use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Field separator.
const SEPARATOR: char = ':';

/// Number of fields in a serialized envelope.
const FIELD_COUNT: usize = 4;

/// Salt, nonce, ciphertext and authentication tag of one sealed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub salt: Salt,
    pub iv: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_SIZE],
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}",
            hex::encode(self.salt),
            hex::encode(self.iv),
            hex::encode(&self.ciphertext),
            hex::encode(self.tag),
            sep = SEPARATOR
        )
    }
}

impl FromStr for Envelope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim().split(SEPARATOR).collect();
        if fields.len() != FIELD_COUNT {
            return Err(Error::InvalidEnvelope(format!(
                "expected {} fields, found {}",
                FIELD_COUNT,
                fields.len()
            )));
        }

        let salt = decode_fixed::<{ scrypt_params::SALT_LENGTH }>("salt", fields[0])?;
        let iv = decode_fixed::<NONCE_SIZE>("iv", fields[1])?;
        let ciphertext = decode_field("ciphertext", fields[2])?;
        let tag = decode_fixed::<TAG_SIZE>("tag", fields[3])?;

        Ok(Self {
            salt,
            iv,
            ciphertext,
            tag,
        })
    }
}

fn decode_field(name: &str, field: &str) -> Result<Vec<u8>, Error> {
    hex::decode(field).map_err(|e| Error::InvalidEnvelope(format!("{}: {}", name, e)))
}

fn decode_fixed<const N: usize>(name: &str, field: &str) -> Result<[u8; N], Error> {
    let bytes = decode_field(name, field)?;
    bytes.try_into().map_err(|v: Vec<u8>| {
        Error::InvalidEnvelope(format!("{}: expected {} bytes, found {}", name, N, v.len()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        Envelope {
            salt: [0xAB; 16],
            iv: [0x01; 12],
            ciphertext: vec![0xDE, 0xAD, 0xBE, 0xEF],
            tag: [0x7F; 16],
        }
    }

    #[test]
    fn test_serialized_layout() {
        let encoded = sample().to_string();
        let fields: Vec<&str> = encoded.split(':').collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], "ab".repeat(16));
        assert_eq!(fields[1], "01".repeat(12));
        assert_eq!(fields[2], "deadbeef");
        assert_eq!(fields[3], "7f".repeat(16));
        assert_eq!(encoded.parse::<Envelope>().unwrap(), sample());
    }

    #[test]
    fn test_empty_ciphertext_field() {
        let mut envelope = sample();
        envelope.ciphertext.clear();
        let parsed: Envelope = envelope.to_string().parse().unwrap();
        assert!(parsed.ciphertext.is_empty());
    }

    #[test]
    fn test_wrong_field_count() {
        let encoded = sample().to_string();
        let truncated = encoded.rsplit_once(':').unwrap().0;
        assert!(matches!(
            truncated.parse::<Envelope>(),
            Err(Error::InvalidEnvelope(_))
        ));
        assert!(format!("{}:00", encoded).parse::<Envelope>().is_err());
        assert!("".parse::<Envelope>().is_err());
    }

    #[test]
    fn test_bad_hex() {
        let encoded = sample().to_string().replace("deadbeef", "deadbeez");
        assert!(matches!(
            encoded.parse::<Envelope>(),
            Err(Error::InvalidEnvelope(_))
        ));
    }

    #[test]
    fn test_wrong_lengths() {
        let short_iv = format!("{}:{}:00:{}", "ab".repeat(16), "01".repeat(11), "7f".repeat(16));
        assert!(short_iv.parse::<Envelope>().is_err());

        let long_tag = format!("{}:{}:00:{}", "ab".repeat(16), "01".repeat(12), "7f".repeat(17));
        assert!(long_tag.parse::<Envelope>().is_err());
    }
}

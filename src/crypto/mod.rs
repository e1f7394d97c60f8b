//! Cryptographic operations for the GitHub VFS.
//!
//! This module provides:
//! - Scrypt secret-based key derivation with a fresh salt per envelope
//! - AES-256-GCM authenticated encryption
//! - The colon-delimited hex envelope every stored blob is wrapped in

mod cipher;
mod codec;
mod envelope;
mod kdf;

pub use cipher::{Cipher, Sealed, NONCE_SIZE, TAG_SIZE};
pub use codec::{open, seal, Codec};
pub use envelope::Envelope;
pub use kdf::{KeyDerivation, Salt};

//! The two byte-level transforms the packer applies to the hidden region:
//! AES-128-CBC over a fixed-size header window, and a single-byte XOR mask
//! over the prefix of every DEX after the first.

use aes::Aes128;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};

use crate::error::{Result, UnpackError};

type Aes128CbcDec = cbc::Decryptor<Aes128>;

pub const BLOCK_SIZE: usize = 16;

/// AES-CBC decryption of the fixed header window. Key, IV and window size
/// are injected at construction.
pub struct BlockCipher {
    key: [u8; 16],
    iv: [u8; 16],
    encrypted_len: usize,
}

impl BlockCipher {
    pub fn new(key: [u8; 16], iv: [u8; 16], encrypted_len: usize) -> Self {
        Self {
            key,
            iv,
            encrypted_len,
        }
    }

    /// Ciphertext window length: the encrypted span plus its padding block.
    pub fn window_len(&self) -> usize {
        self.encrypted_len + BLOCK_SIZE
    }

    /// Decrypts exactly one window of ciphertext and strips the PKCS#7
    /// padding. Bytes past the window are never read.
    pub fn decrypt_fixed(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let window = self.window_len();
        if ciphertext.len() < window {
            return Err(UnpackError::InsufficientData {
                needed: window,
                have: ciphertext.len(),
            });
        }

        let mut buf = ciphertext[..window].to_vec();
        let plaintext = Aes128CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_mut::<Pkcs7>(&mut buf)
            .map_err(|_| UnpackError::PaddingError)?;
        Ok(plaintext.to_vec())
    }
}

/// The packer's stream obfuscation: XOR a fixed-length prefix with one key
/// byte. Self-inverse, so the same call packs and unpacks.
pub struct XorMask {
    key: u8,
    window: usize,
}

impl XorMask {
    pub fn new(key: u8, window: usize) -> Self {
        Self { key, window }
    }

    /// Masks the first `min(window, len)` bytes in place.
    pub fn apply(&self, data: &mut [u8]) {
        let n = self.window.min(data.len());
        for byte in &mut data[..n] {
            *byte ^= self.key;
        }
    }
}

//! # Envelope Tag Cipher
//!
//! Encrypts a message type name into a single AES block (CBC, PKCS#7) and
//! renders the ciphertext as lowercase hex. One block is 16 bytes, so the
//! hex tag is always exactly [`TAG_HEX_LEN`] characters, which is the width
//! of the predictive envelope's type slot.
//!
//! ## Invariant
//!
//! PKCS#7 always adds at least one padding byte, so a single block carries
//! at most [`MAX_TAG_PLAINTEXT_LEN`] plaintext bytes. Longer names are
//! rejected; they are never split across blocks, since that would change
//! the envelope layout.
//!
//! Encryption is deterministic for a given key and IV. That is what lets a
//! receiver recover the tag, and it is also why this is obfuscation rather
//! than confidentiality.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::CipherError;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Cipher block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Width of a hex-encoded tag.
pub const TAG_HEX_LEN: usize = BLOCK_SIZE * 2;

/// Longest plaintext that still pads into a single block.
pub const MAX_TAG_PLAINTEXT_LEN: usize = BLOCK_SIZE - 1;

/// Built-in AES-128 key. Public; obfuscation only.
pub const DEFAULT_KEY_128: [u8; 16] = *b"protospark-tag-k";

/// Built-in AES-256 key. Public; obfuscation only.
pub const DEFAULT_KEY_256: [u8; 32] = *b"protospark-envelope-type-tag-key";

/// Built-in IV. Public; obfuscation only.
pub const DEFAULT_IV: [u8; 16] = *b"protospark-tagiv";

/// Supported tag ciphers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CipherAlgorithm {
    /// AES-128 in CBC mode.
    #[default]
    #[serde(rename = "aes-128-cbc")]
    Aes128Cbc,
    /// AES-256 in CBC mode.
    #[serde(rename = "aes-256-cbc")]
    Aes256Cbc,
}

impl CipherAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aes128Cbc => "aes-128-cbc",
            Self::Aes256Cbc => "aes-256-cbc",
        }
    }

    /// Required key length in bytes.
    pub fn key_len(&self) -> usize {
        match self {
            Self::Aes128Cbc => 16,
            Self::Aes256Cbc => 32,
        }
    }

    fn default_key(&self) -> &'static [u8] {
        match self {
            Self::Aes128Cbc => &DEFAULT_KEY_128,
            Self::Aes256Cbc => &DEFAULT_KEY_256,
        }
    }
}

impl std::fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cipher configuration with recognized options `algo`, `key` and `iv`.
///
/// `key` and `iv` are hex strings; absent values fall back to the built-in
/// constants for the selected algorithm.
///
/// ```yaml
/// algo: aes-256-cbc
/// key: 000102030405060708090a0b0c0d0e0f000102030405060708090a0b0c0d0e0f
/// iv: 0f0e0d0c0b0a09080706050403020100
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CipherConfig {
    /// Cipher to use.
    pub algo: CipherAlgorithm,
    /// Hex-encoded symmetric key.
    pub key: Option<String>,
    /// Hex-encoded initialization vector.
    pub iv: Option<String>,
}

impl std::fmt::Debug for CipherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherConfig")
            .field("algo", &self.algo)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("iv", &self.iv.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Encrypts and decrypts single-block envelope tags.
#[derive(Clone)]
pub struct EnvelopeCipher {
    algo: CipherAlgorithm,
    key: Zeroizing<Vec<u8>>,
    iv: Zeroizing<[u8; BLOCK_SIZE]>,
}

impl EnvelopeCipher {
    /// Build a cipher from raw key and IV bytes.
    pub fn new(algo: CipherAlgorithm, key: &[u8], iv: &[u8]) -> Result<Self, CipherError> {
        if key.len() != algo.key_len() {
            return Err(CipherError::InvalidKeyLength {
                algo: algo.as_str(),
                expected: algo.key_len(),
                actual: key.len(),
            });
        }
        let iv: [u8; BLOCK_SIZE] = iv
            .try_into()
            .map_err(|_| CipherError::InvalidIvLength(iv.len()))?;
        Ok(Self {
            algo,
            key: Zeroizing::new(key.to_vec()),
            iv: Zeroizing::new(iv),
        })
    }

    /// Build a cipher from configuration, filling gaps with the built-in
    /// key and IV.
    pub fn from_config(config: &CipherConfig) -> Result<Self, CipherError> {
        let key = match &config.key {
            Some(hex_key) => Zeroizing::new(decode_hex(hex_key)?),
            None => Zeroizing::new(config.algo.default_key().to_vec()),
        };
        let iv = match &config.iv {
            Some(hex_iv) => Zeroizing::new(decode_hex(hex_iv)?),
            None => Zeroizing::new(DEFAULT_IV.to_vec()),
        };
        Self::new(config.algo, &key, &iv)
    }

    /// The configured algorithm.
    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algo
    }

    /// Encrypt a type name into a [`TAG_HEX_LEN`]-character hex tag.
    pub fn encrypt_tag(&self, plaintext: &str) -> Result<String, CipherError> {
        if plaintext.len() > MAX_TAG_PLAINTEXT_LEN {
            return Err(CipherError::PlaintextTooLong {
                len: plaintext.len(),
                max: MAX_TAG_PLAINTEXT_LEN,
            });
        }
        let ciphertext = match self.algo {
            CipherAlgorithm::Aes128Cbc => Aes128CbcEnc::new_from_slices(&self.key, &*self.iv)
                .map_err(|e| self.key_error(e))?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes()),
            CipherAlgorithm::Aes256Cbc => Aes256CbcEnc::new_from_slices(&self.key, &*self.iv)
                .map_err(|e| self.key_error(e))?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes()),
        };
        Ok(hex::encode(ciphertext))
    }

    /// Decrypt a hex tag produced by [`encrypt_tag`](Self::encrypt_tag).
    pub fn decrypt_tag(&self, tag: &str) -> Result<String, CipherError> {
        if tag.len() != TAG_HEX_LEN {
            return Err(CipherError::InvalidTagLength {
                expected: TAG_HEX_LEN,
                actual: tag.len(),
            });
        }
        let ciphertext = decode_hex(tag)?;
        let plaintext = match self.algo {
            CipherAlgorithm::Aes128Cbc => Aes128CbcDec::new_from_slices(&self.key, &*self.iv)
                .map_err(|e| self.key_error(e))?
                .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext),
            CipherAlgorithm::Aes256Cbc => Aes256CbcDec::new_from_slices(&self.key, &*self.iv)
                .map_err(|e| self.key_error(e))?
                .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext),
        }
        .map_err(|e| CipherError::Undecryptable(e.to_string()))?;
        String::from_utf8(plaintext).map_err(|e| CipherError::Undecryptable(e.to_string()))
    }

    fn key_error(&self, _: aes::cipher::InvalidLength) -> CipherError {
        CipherError::InvalidKeyLength {
            algo: self.algo.as_str(),
            expected: self.algo.key_len(),
            actual: self.key.len(),
        }
    }
}

impl Default for EnvelopeCipher {
    fn default() -> Self {
        Self {
            algo: CipherAlgorithm::Aes128Cbc,
            key: Zeroizing::new(DEFAULT_KEY_128.to_vec()),
            iv: Zeroizing::new(DEFAULT_IV),
        }
    }
}

impl std::fmt::Debug for EnvelopeCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EnvelopeCipher({}, <key>)", self.algo)
    }
}

fn decode_hex(input: &str) -> Result<Vec<u8>, CipherError> {
    hex::decode(input.trim()).map_err(|e| CipherError::HexDecode(e.to_string()))
}

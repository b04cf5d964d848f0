use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use crate::config;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("encryption failed: {0}")]
    Encryption(String),
    #[error("decryption failed: {0}")]
    Decryption(String),
    #[error("base64 decoding failed: {0}")]
    Base64(String),
}

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes192CbcEnc = cbc::Encryptor<aes::Aes192>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes192CbcDec = cbc::Decryptor<aes::Aes192>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Encrypt with AES-CBC and PKCS#7 padding. The AES variant follows the key length.
pub fn aes_cbc_encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    match key.len() {
        16 => cbc_encrypt::<Aes128CbcEnc>(key, iv, plaintext),
        24 => cbc_encrypt::<Aes192CbcEnc>(key, iv, plaintext),
        32 => cbc_encrypt::<Aes256CbcEnc>(key, iv, plaintext),
        n => Err(CryptoError::Encryption(format!("unsupported key length {}", n))),
    }
}

/// Decrypt AES-CBC ciphertext and strip PKCS#7 padding.
pub fn aes_cbc_decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.is_empty() || ciphertext.len() % config::AES_BLOCK_SIZE != 0 {
        return Err(CryptoError::Decryption(format!(
            "ciphertext length {} is not a positive multiple of {}",
            ciphertext.len(),
            config::AES_BLOCK_SIZE
        )));
    }

    match key.len() {
        16 => cbc_decrypt::<Aes128CbcDec>(key, iv, ciphertext),
        24 => cbc_decrypt::<Aes192CbcDec>(key, iv, ciphertext),
        32 => cbc_decrypt::<Aes256CbcDec>(key, iv, ciphertext),
        n => Err(CryptoError::Decryption(format!("unsupported key length {}", n))),
    }
}

fn cbc_encrypt<E>(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>
where
    E: KeyIvInit + BlockEncryptMut,
{
    let cipher =
        E::new_from_slices(key, iv).map_err(|e| CryptoError::Encryption(e.to_string()))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn cbc_decrypt<D>(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>
where
    D: KeyIvInit + BlockDecryptMut,
{
    let cipher =
        D::new_from_slices(key, iv).map_err(|e| CryptoError::Decryption(e.to_string()))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| CryptoError::Decryption(e.to_string()))
}

/// Standard (padded) base64 encoding, returned as ASCII bytes.
pub fn base64_encode(data: &[u8]) -> Vec<u8> {
    STANDARD.encode(data).into_bytes()
}

/// Standard base64 decoding. Input must already be padded to a multiple of 4.
pub fn base64_decode(data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    STANDARD
        .decode(data)
        .map_err(|e| CryptoError::Base64(e.to_string()))
}

/// Securely zero a key buffer.
pub fn secure_zero(buf: &mut [u8]) {
    for byte in buf.iter_mut() {
        unsafe {
            std::ptr::write_volatile(byte, 0);
        }
    }
    std::sync::atomic::fence(std::sync::atomic::Ordering::SeqCst);
}

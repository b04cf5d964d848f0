use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::crypto;

/// Sentinel appended after the (transformed) payload. Shared by encoder and decoder.
pub const END_MARKER: &[u8] = b"###END###";

// Pixel layout
pub const CHANNELS: usize = 3;
pub const MAX_SAMPLE: u8 = 255;

// AES-CBC parameters
pub const AES_BLOCK_SIZE: usize = 16;
pub const AES_KEY_SIZES: [usize; 3] = [16, 24, 32];

// Defaults
pub const DEFAULT_NOISE_LEVEL: u8 = 0;
pub const DEFAULT_BIT_POSITION: u8 = 0;

// Quality analysis parameters
pub const SSIM_WINDOW: usize = 7;
pub const SSIM_K1: f64 = 0.01;
pub const SSIM_K2: f64 = 0.03;
/// Heuristic average bits per pixel pair used for quick capacity estimates.
pub const ESTIMATED_BITS_PER_PAIR: usize = 5;

/// Lossless file extensions accepted for stego output.
pub const LOSSLESS_EXTENSIONS: [&str; 2] = ["png", "bmp"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("AES encryption requires a key")]
    MissingKey,
    #[error("AES encryption requires an IV")]
    MissingIv,
    #[error("invalid AES key length: {0} bytes (expected 16, 24 or 32)")]
    InvalidKeyLength(usize),
    #[error("invalid AES IV length: {0} bytes (expected 16)")]
    InvalidIvLength(usize),
    #[error("unknown algorithm: {0:?}")]
    UnknownAlgorithm(String),
    #[error("unknown encryption mode: {0:?}")]
    UnknownEncryption(String),
    #[error("algorithm {0} is not supported by this codec")]
    UnsupportedAlgorithm(Algorithm),
}

/// Embedding algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    Pvd,
    XSignificantBit,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Pvd => f.write_str("PVD"),
            Algorithm::XSignificantBit => f.write_str("X Significant Bit"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pvd" => Ok(Algorithm::Pvd),
            "x significant bit" | "xsb" | "x-significant-bit" => Ok(Algorithm::XSignificantBit),
            _ => Err(ConfigError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Payload transform applied before embedding and reversed after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncryptionMode {
    #[default]
    None,
    Base64,
    Aes,
}

impl fmt::Display for EncryptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionMode::None => f.write_str("None"),
            EncryptionMode::Base64 => f.write_str("Base64"),
            EncryptionMode::Aes => f.write_str("AES"),
        }
    }
}

impl FromStr for EncryptionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(EncryptionMode::None),
            "base64" => Ok(EncryptionMode::Base64),
            "aes" => Ok(EncryptionMode::Aes),
            _ => Err(ConfigError::UnknownEncryption(s.to_string())),
        }
    }
}

/// Unvalidated configuration record, as supplied by a loader or the CLI.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    pub algorithm: Algorithm,
    pub encryption: EncryptionMode,
    pub key: Option<Vec<u8>>,
    pub iv: Option<Vec<u8>>,
    /// Only meaningful for [`Algorithm::XSignificantBit`].
    pub bit_position: u8,
    pub noise_level: u8,
}

impl ConfigOptions {
    /// Check the record and freeze it into a [`StegoConfig`].
    pub fn validate(self) -> Result<StegoConfig, ConfigError> {
        let cipher = match self.encryption {
            EncryptionMode::None => CipherKind::None,
            EncryptionMode::Base64 => CipherKind::Base64,
            EncryptionMode::Aes => {
                let key = self.key.ok_or(ConfigError::MissingKey)?;
                let iv = self.iv.ok_or(ConfigError::MissingIv)?;
                CipherKind::Aes(AesKey::new(key, iv)?)
            }
        };

        Ok(StegoConfig {
            algorithm: self.algorithm,
            cipher,
            bit_position: self.bit_position,
            noise_level: self.noise_level,
        })
    }
}

/// AES key and IV, length-checked. Zeroed on drop.
#[derive(Clone)]
pub struct AesKey {
    key: Vec<u8>,
    iv: [u8; AES_BLOCK_SIZE],
}

impl AesKey {
    pub fn new(key: Vec<u8>, iv: Vec<u8>) -> Result<Self, ConfigError> {
        if !AES_KEY_SIZES.contains(&key.len()) {
            return Err(ConfigError::InvalidKeyLength(key.len()));
        }
        let iv: [u8; AES_BLOCK_SIZE] = iv
            .as_slice()
            .try_into()
            .map_err(|_| ConfigError::InvalidIvLength(iv.len()))?;
        Ok(Self { key, iv })
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn iv(&self) -> &[u8; AES_BLOCK_SIZE] {
        &self.iv
    }
}

impl fmt::Debug for AesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AesKey({} bits, <redacted>)", self.key.len() * 8)
    }
}

impl Drop for AesKey {
    fn drop(&mut self) {
        crypto::secure_zero(&mut self.key);
        crypto::secure_zero(&mut self.iv);
    }
}

/// Validated cipher selection.
#[derive(Debug, Clone)]
pub enum CipherKind {
    None,
    Base64,
    Aes(AesKey),
}

impl CipherKind {
    pub fn mode(&self) -> EncryptionMode {
        match self {
            CipherKind::None => EncryptionMode::None,
            CipherKind::Base64 => EncryptionMode::Base64,
            CipherKind::Aes(_) => EncryptionMode::Aes,
        }
    }
}

/// Immutable, validated session configuration.
#[derive(Debug, Clone)]
pub struct StegoConfig {
    pub algorithm: Algorithm,
    pub cipher: CipherKind,
    pub bit_position: u8,
    pub noise_level: u8,
}

impl Default for StegoConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Pvd,
            cipher: CipherKind::None,
            bit_position: DEFAULT_BIT_POSITION,
            noise_level: DEFAULT_NOISE_LEVEL,
        }
    }
}

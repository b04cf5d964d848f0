use crate::config::{CipherKind, END_MARKER};
use crate::crypto::{self, CryptoError};

/// A reversible payload transform applied around the PVD codec.
pub trait PayloadTransform {
    /// Encode direction, before the end marker is appended.
    fn seal(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;
    /// Decode direction, after the end marker is stripped.
    fn open(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

impl PayloadTransform for CipherKind {
    fn seal(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match self {
            CipherKind::None => Ok(data.to_vec()),
            CipherKind::Base64 => Ok(crypto::base64_encode(data)),
            CipherKind::Aes(key) => crypto::aes_cbc_encrypt(key.key(), key.iv(), data),
        }
    }

    fn open(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match self {
            CipherKind::None => Ok(data.to_vec()),
            CipherKind::Base64 => crypto::base64_decode(&repad_base64(data)),
            CipherKind::Aes(key) => crypto::aes_cbc_decrypt(key.key(), key.iv(), data),
        }
    }
}

/// Append the end marker to a (transformed) payload.
pub fn append_marker(payload: &[u8]) -> Vec<u8> {
    let mut framed = Vec::with_capacity(payload.len() + END_MARKER.len());
    framed.extend_from_slice(payload);
    framed.extend_from_slice(END_MARKER);
    framed
}

/// Restore `=` padding so the length is a multiple of 4.
pub fn repad_base64(data: &[u8]) -> Vec<u8> {
    let mut padded = data.to_vec();
    let missing = data.len() % 4;
    if missing != 0 {
        padded.resize(data.len() + 4 - missing, b'=');
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AesKey;

    #[test]
    fn test_marker_append() {
        let framed = append_marker(b"HELLO");
        assert_eq!(framed, b"HELLO###END###");
        assert!(framed.ends_with(END_MARKER));
    }

    #[test]
    fn test_repad_base64() {
        assert_eq!(repad_base64(b"SEVMTE8"), b"SEVMTE8=");
        assert_eq!(repad_base64(b"SEVMTA"), b"SEVMTA==");
        assert_eq!(repad_base64(b"SEVM"), b"SEVM");
        assert_eq!(repad_base64(b""), b"");
    }

    #[test]
    fn test_base64_open_tolerates_lost_padding() {
        let cipher = CipherKind::Base64;
        let sealed = cipher.seal(b"HELLO").unwrap();
        assert_eq!(sealed, b"SEVMTE8=");
        assert_eq!(cipher.open(b"SEVMTE8").unwrap(), b"HELLO");
    }

    #[test]
    fn test_identity_transform() {
        let cipher = CipherKind::None;
        assert_eq!(cipher.seal(b"\x00\xffraw").unwrap(), b"\x00\xffraw");
        assert_eq!(cipher.open(b"\x00\xffraw").unwrap(), b"\x00\xffraw");
    }

    #[test]
    fn test_aes_transform_roundtrip() {
        let key = AesKey::new(b"0123456789abcdef".to_vec(), b"fedcba9876543210".to_vec()).unwrap();
        let cipher = CipherKind::Aes(key);
        let sealed = cipher.seal(b"attack at dawn").unwrap();
        assert_ne!(sealed, b"attack at dawn");
        assert_eq!(cipher.open(&sealed).unwrap(), b"attack at dawn");
        assert!(cipher.open(&sealed[..sealed.len() - 1]).is_err());
    }
}

pub mod decode;
pub mod encode;
pub mod observer;

use crate::config::{Algorithm, ConfigError, StegoConfig};
use crate::error::StegoError;
use crate::integrity;
use crate::noise::{NoiseInjector, UniformNoise};
use crate::raster::PixelImage;
use encode::EncodeReport;
use observer::PipelineObserver;

/// Encode/decode façade bound to one validated configuration.
///
/// # Example
///
/// ```rust
/// use pvdsteg::{NoopObserver, PixelImage, Steganography, StegoConfig};
///
/// let stego = Steganography::new(StegoConfig::default()).unwrap();
/// let mut image = PixelImage::filled(64, 64, [128, 128, 128]);
///
/// stego.encode(&mut image, b"HELLO", &NoopObserver).unwrap();
/// assert_eq!(stego.decode(&image, &NoopObserver).unwrap(), b"HELLO");
/// ```
pub struct Steganography<N = UniformNoise> {
    config: StegoConfig,
    noise: N,
}

impl Steganography<UniformNoise> {
    /// Orchestrator with entropy-seeded uniform noise.
    pub fn new(config: StegoConfig) -> Result<Self, StegoError> {
        Self::with_noise(config, UniformNoise::new())
    }
}

impl<N: NoiseInjector> Steganography<N> {
    /// Orchestrator with a custom noise collaborator.
    pub fn with_noise(config: StegoConfig, noise: N) -> Result<Self, StegoError> {
        match config.algorithm {
            Algorithm::Pvd => Ok(Self { config, noise }),
            other => Err(ConfigError::UnsupportedAlgorithm(other).into()),
        }
    }

    pub fn config(&self) -> &StegoConfig {
        &self.config
    }

    /// Hide `payload` in `image`, in place. On error the image is unchanged.
    pub fn encode<O: PipelineObserver + ?Sized>(
        &self,
        image: &mut PixelImage,
        payload: &[u8],
        observer: &O,
    ) -> Result<EncodeReport, StegoError> {
        encode::encode_payload(&self.config, &self.noise, image, payload, observer)
    }

    /// Recover the payload hidden in `image`.
    pub fn decode<O: PipelineObserver + ?Sized>(
        &self,
        image: &PixelImage,
        observer: &O,
    ) -> Result<Vec<u8>, StegoError> {
        decode::decode_payload(&self.config, image, observer)
    }
}

/// Result of an in-memory encode → decode roundtrip.
pub struct RoundtripResult {
    /// SHA-256 hex digest of the original payload.
    pub original_hash: String,
    /// SHA-256 hex digest of the decoded payload.
    pub decoded_hash: String,
    /// `true` if the hashes match (lossless round-trip).
    pub matched: bool,
    pub report: EncodeReport,
    /// The stego image produced by the encode step.
    pub stego: PixelImage,
}

/// Encode `payload` into a copy of `cover`, decode it back and compare digests.
/// The cover itself is left untouched.
pub fn roundtrip<N, O>(
    stego: &Steganography<N>,
    cover: &PixelImage,
    payload: &[u8],
    observer: &O,
) -> Result<RoundtripResult, StegoError>
where
    N: NoiseInjector,
    O: PipelineObserver + ?Sized,
{
    let original_hash = integrity::sha256_hex(payload);

    let mut image = cover.clone();
    let report = stego.encode(&mut image, payload, observer)?;
    let decoded = stego.decode(&image, observer)?;

    let decoded_hash = integrity::sha256_hex(&decoded);
    let matched = original_hash == decoded_hash;

    Ok(RoundtripResult {
        original_hash,
        decoded_hash,
        matched,
        report,
        stego: image,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::observer::{NoopObserver, Stage};
    use super::*;
    use crate::config::{ConfigOptions, EncryptionMode};
    use crate::noise::NoNoise;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<Stage>>);

    impl PipelineObserver for Recorder {
        fn on_stage(&self, stage: Stage, _detail: &str) {
            self.0.borrow_mut().push(stage);
        }
    }

    #[test]
    fn test_stage_order() {
        let stego = Steganography::with_noise(StegoConfig::default(), NoNoise).unwrap();
        let mut image = PixelImage::filled(32, 32, [90, 90, 90]);

        let rec = Recorder::default();
        stego.encode(&mut image, b"stages", &rec).unwrap();
        assert_eq!(
            *rec.0.borrow(),
            vec![
                Stage::Encrypting,
                Stage::Marking,
                Stage::Embedding,
                Stage::NoiseInjecting,
                Stage::Done
            ]
        );

        let rec = Recorder::default();
        stego.decode(&image, &rec).unwrap();
        assert_eq!(
            *rec.0.borrow(),
            vec![Stage::Extracting, Stage::MarkerSearch, Stage::Decrypting, Stage::Done]
        );
    }

    #[test]
    fn test_failed_encode_stops_at_embedding() {
        let stego = Steganography::with_noise(StegoConfig::default(), NoNoise).unwrap();
        let mut image = PixelImage::filled(4, 4, [90, 90, 90]);
        let rec = Recorder::default();

        let err = stego.encode(&mut image, b"too big", &rec).unwrap_err();
        assert!(matches!(err, StegoError::CapacityExceeded { .. }));
        assert_eq!(rec.0.borrow().last(), Some(&Stage::Embedding));
    }

    #[test]
    fn test_xsb_algorithm_rejected() {
        let config = ConfigOptions {
            algorithm: Algorithm::XSignificantBit,
            ..Default::default()
        }
        .validate()
        .unwrap();
        let err = Steganography::new(config).err().unwrap();
        assert!(matches!(
            err,
            StegoError::Config(ConfigError::UnsupportedAlgorithm(Algorithm::XSignificantBit))
        ));
    }

    #[test]
    fn test_roundtrip_hashes_match() {
        let config = ConfigOptions {
            encryption: EncryptionMode::Base64,
            noise_level: 2,
            ..Default::default()
        }
        .validate()
        .unwrap();
        let stego = Steganography::with_noise(config, crate::noise::UniformNoise::seeded(9)).unwrap();
        let cover = PixelImage::filled(40, 40, [200, 10, 70]);

        let result = roundtrip(&stego, &cover, b"roundtrip payload", &NoopObserver).unwrap();
        assert!(result.matched);
        assert_eq!(result.original_hash, result.decoded_hash);
        assert_ne!(result.stego, cover);
        assert_eq!(cover, PixelImage::filled(40, 40, [200, 10, 70]));
    }
}

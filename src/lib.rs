pub mod analysis;
pub mod config;
mod crypto;
pub mod error;
pub mod framing;
mod integrity;
mod noise;
pub mod pipeline;
pub mod pvd;
pub mod raster;

pub use config::{Algorithm, ConfigError, ConfigOptions, EncryptionMode, StegoConfig};
pub use crypto::CryptoError;
pub use error::StegoError;
pub use noise::{NoNoise, NoiseInjector, Reservation, UniformNoise};
pub use pipeline::encode::EncodeReport;
pub use pipeline::observer::{LogObserver, NoopObserver, PipelineObserver, Stage};
pub use pipeline::{roundtrip, RoundtripResult, Steganography};
pub use raster::io::{load_image, save_image};
pub use raster::PixelImage;

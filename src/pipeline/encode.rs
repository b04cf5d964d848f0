use crate::config::StegoConfig;
use crate::error::StegoError;
use crate::framing::{self, PayloadTransform};
use crate::noise::{NoiseInjector, Reservation};
use crate::pvd::{self, EmbedReport};
use crate::raster::PixelImage;

use super::observer::{PipelineObserver, Stage};

/// Outcome of a successful encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeReport {
    pub embed: EmbedReport,
    /// Length of the transformed payload plus end marker.
    pub framed_len: usize,
    /// Samples changed by the noise stage.
    pub noise_samples: usize,
}

/// Full encode pipeline: payload -> [encrypt] -> end marker -> PVD embed -> [noise].
///
/// `image` is only written once every earlier stage has succeeded.
pub fn encode_payload<N, O>(
    config: &StegoConfig,
    noise: &N,
    image: &mut PixelImage,
    payload: &[u8],
    observer: &O,
) -> Result<EncodeReport, StegoError>
where
    N: NoiseInjector + ?Sized,
    O: PipelineObserver + ?Sized,
{
    if payload.is_empty() {
        return Err(StegoError::InvalidInput("payload is empty".into()));
    }

    // Step 1: Encrypt
    observer.on_stage(
        Stage::Encrypting,
        &format!("{} bytes, mode {}", payload.len(), config.cipher.mode()),
    );
    let sealed = config.cipher.seal(payload)?;

    // Step 2: Append the end marker
    observer.on_stage(Stage::Marking, &format!("{} transformed bytes", sealed.len()));
    let framed = framing::append_marker(&sealed);

    // Step 3: Embed into pixel pairs
    observer.on_stage(
        Stage::Embedding,
        &format!(
            "{} framed bytes into {}x{} image",
            framed.len(),
            image.width(),
            image.height()
        ),
    );
    let embed = pvd::embed(image, &framed)?;

    // Step 4: Perturb the pixels left over
    observer.on_stage(
        Stage::NoiseInjecting,
        &format!("level {}, {} steps reserved", config.noise_level, embed.steps_used),
    );
    let reserved = Reservation {
        payload_len: framed.len(),
        steps_used: embed.steps_used,
    };
    let noise_samples = noise.inject(image, config.noise_level, &reserved);

    observer.on_stage(
        Stage::Done,
        &format!(
            "embedded {} of {} available bits",
            embed.bits_embedded, embed.capacity_bits
        ),
    );

    Ok(EncodeReport {
        embed,
        framed_len: framed.len(),
        noise_samples,
    })
}

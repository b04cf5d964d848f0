use crate::config::StegoConfig;
use crate::error::StegoError;
use crate::framing::PayloadTransform;
use crate::pvd;
use crate::raster::PixelImage;

use super::observer::{PipelineObserver, Stage};

/// Full decode pipeline: PVD extract -> end marker search -> [decrypt].
///
/// A missing end marker yields [`StegoError::DecodeIncomplete`] carrying the
/// raw bytes recovered so far; they are not decrypted.
pub fn decode_payload<O>(
    config: &StegoConfig,
    image: &PixelImage,
    observer: &O,
) -> Result<Vec<u8>, StegoError>
where
    O: PipelineObserver + ?Sized,
{
    // Step 1: Walk the pixel pairs
    observer.on_stage(
        Stage::Extracting,
        &format!("{}x{} image", image.width(), image.height()),
    );
    let extraction = pvd::extract(image);

    // Step 2: Check the end marker
    observer.on_stage(
        Stage::MarkerSearch,
        &format!(
            "{} bytes after {} steps, marker {}",
            extraction.bytes.len(),
            extraction.steps_read,
            if extraction.marker_found { "found" } else { "missing" }
        ),
    );
    if !extraction.marker_found {
        return Err(StegoError::DecodeIncomplete {
            partial: extraction.bytes,
        });
    }

    // Step 3: Undo the payload transform
    observer.on_stage(
        Stage::Decrypting,
        &format!("{} bytes, mode {}", extraction.bytes.len(), config.cipher.mode()),
    );
    let plaintext = config.cipher.open(&extraction.bytes)?;

    observer.on_stage(Stage::Done, &format!("recovered {} bytes", plaintext.len()));
    Ok(plaintext)
}

use std::path::Path;

use image::{ImageFormat, RgbImage};
use log::{debug, info};

use crate::config;
use crate::error::StegoError;
use crate::raster::PixelImage;

/// Decode an image file into RGB8. Non-RGB inputs (grayscale, RGBA, ...)
/// are converted.
pub fn load_image(path: &Path) -> Result<PixelImage, StegoError> {
    let decoded = image::open(path).map_err(|source| StegoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("loaded {} as {:?}", path.display(), decoded.color());

    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    PixelImage::from_raw(width as usize, height as usize, rgb.into_raw())
}

/// Persist an image in a lossless format chosen from the file extension.
pub fn save_image(image: &PixelImage, path: &Path) -> Result<(), StegoError> {
    let format = lossless_format(path)?;

    let buffer = RgbImage::from_raw(
        image.width() as u32,
        image.height() as u32,
        image.as_raw().to_vec(),
    )
    .ok_or_else(|| StegoError::InvalidInput("pixel buffer does not match dimensions".into()))?;

    buffer
        .save_with_format(path, format)
        .map_err(|source| StegoError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    info!("saved stego image to {}", path.display());
    Ok(())
}

/// Map an output path to a lossless format, rejecting anything that would
/// re-quantise pixel values.
pub fn lossless_format(path: &Path) -> Result<ImageFormat, StegoError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if !config::LOSSLESS_EXTENSIONS.contains(&ext.as_str()) {
        return Err(StegoError::InvalidInput(format!(
            "refusing to write {:?}: only lossless .png or .bmp output preserves the payload",
            path.display().to_string()
        )));
    }

    ImageFormat::from_extension(&ext)
        .ok_or_else(|| StegoError::InvalidInput(format!("unknown image extension: {}", ext)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lossless_format() {
        assert_eq!(lossless_format(Path::new("a.png")).unwrap(), ImageFormat::Png);
        assert_eq!(lossless_format(Path::new("a.BMP")).unwrap(), ImageFormat::Bmp);
        assert!(matches!(
            lossless_format(Path::new("a.jpg")),
            Err(StegoError::InvalidInput(_))
        ));
        assert!(lossless_format(Path::new("noext")).is_err());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = std::env::temp_dir().join("pvdsteg_test_raster_io");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("gradient.png");

        let samples: Vec<u8> = (0..5 * 4 * 3).map(|i| (i * 7 % 256) as u8).collect();
        let img = PixelImage::from_raw(5, 4, samples).unwrap();
        save_image(&img, &path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded, img);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing_file_keeps_source() {
        use std::error::Error;

        let err = load_image(Path::new("/definitely/not/here.png")).unwrap_err();
        match &err {
            StegoError::Io { path, source } => {
                assert_eq!(path, Path::new("/definitely/not/here.png"));
                assert!(matches!(source, image::ImageError::IoError(_)));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(err.source().is_some());

        let chained = format!("{:#}", anyhow::Error::from(err));
        assert!(chained.contains("here.png"), "{}", chained);
        assert!(chained.contains(": "), "{}", chained);
    }
}

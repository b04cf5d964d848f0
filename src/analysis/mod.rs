//! Stego-quality metrics and capacity reporting.

pub mod batch;

use rayon::prelude::*;

use crate::config::{self, END_MARKER};
use crate::error::StegoError;
use crate::pvd::{self, cursor::PairCursor};
use crate::raster::PixelImage;

/// Exact capacity of a cover image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityReport {
    /// Pixel-pair steps visited by the codec.
    pub steps: usize,
    pub total_bits: usize,
    /// Largest transformed payload that still fits alongside the end marker.
    pub payload_bytes: usize,
}

pub fn capacity_report(image: &PixelImage) -> CapacityReport {
    let total_bits = pvd::capacity_bits(image);
    CapacityReport {
        steps: PairCursor::total_steps(image.width(), image.height()),
        total_bits,
        payload_bytes: (total_bits / 8).saturating_sub(END_MARKER.len()),
    }
}

/// Rough capacity from dimensions alone, assuming an average of five bits per pixel pair.
pub fn estimated_capacity_bits(width: usize, height: usize) -> usize {
    (width * height / 2) * config::ESTIMATED_BITS_PER_PAIR
}

fn check_dimensions(a: &PixelImage, b: &PixelImage) -> Result<(), StegoError> {
    if !a.same_dimensions(b) {
        return Err(StegoError::InvalidInput(format!(
            "image sizes differ: {}x{} vs {}x{}",
            a.width(),
            a.height(),
            b.width(),
            b.height()
        )));
    }
    if a.is_empty() {
        return Err(StegoError::InvalidInput("images are empty".into()));
    }
    Ok(())
}

/// Mean squared error over every sample.
pub fn mse(original: &PixelImage, stego: &PixelImage) -> Result<f64, StegoError> {
    check_dimensions(original, stego)?;

    let sum: f64 = (0..original.height())
        .into_par_iter()
        .map(|row| {
            original
                .row(row)
                .iter()
                .zip(stego.row(row))
                .map(|(&a, &b)| {
                    let d = a as f64 - b as f64;
                    d * d
                })
                .sum::<f64>()
        })
        .sum();

    Ok(sum / original.as_raw().len() as f64)
}

/// Peak signal-to-noise ratio in dB. Identical images give `f64::INFINITY`.
pub fn psnr(original: &PixelImage, stego: &PixelImage) -> Result<f64, StegoError> {
    let mse = mse(original, stego)?;
    if mse == 0.0 {
        return Ok(f64::INFINITY);
    }
    let peak = config::MAX_SAMPLE as f64;
    Ok(20.0 * (peak / mse.sqrt()).log10())
}

/// BT.601 luma plane, rounded to integer levels.
fn luma(image: &PixelImage) -> Vec<f64> {
    image
        .as_raw()
        .chunks_exact(config::CHANNELS)
        .map(|px| (0.299 * px[0] as f64 + 0.587 * px[1] as f64 + 0.114 * px[2] as f64).round())
        .collect()
}

/// Mean structural similarity of the luma planes.
///
/// Uses a 7×7 uniform window with sample covariance, evaluated at every
/// position where the window lies fully inside the image.
pub fn ssim(original: &PixelImage, stego: &PixelImage) -> Result<f64, StegoError> {
    check_dimensions(original, stego)?;
    let (width, height) = (original.width(), original.height());
    let win = config::SSIM_WINDOW;
    if width < win || height < win {
        return Err(StegoError::InvalidInput(format!(
            "SSIM needs at least {}x{} pixels, got {}x{}",
            win, win, width, height
        )));
    }

    let x = luma(original);
    let y = luma(stego);

    let range = config::MAX_SAMPLE as f64;
    let c1 = (config::SSIM_K1 * range).powi(2);
    let c2 = (config::SSIM_K2 * range).powi(2);
    let n = (win * win) as f64;
    let cov_norm = n / (n - 1.0);

    let rows = height - win + 1;
    let cols = width - win + 1;

    let total: f64 = (0..rows)
        .into_par_iter()
        .map(|top| {
            let mut row_sum = 0.0;
            for left in 0..cols {
                let (mut sx, mut sy, mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
                for r in top..top + win {
                    let base = r * width + left;
                    for i in base..base + win {
                        let (a, b) = (x[i], y[i]);
                        sx += a;
                        sy += b;
                        sxx += a * a;
                        syy += b * b;
                        sxy += a * b;
                    }
                }
                let (ux, uy) = (sx / n, sy / n);
                let vx = cov_norm * (sxx / n - ux * ux);
                let vy = cov_norm * (syy / n - uy * uy);
                let vxy = cov_norm * (sxy / n - ux * uy);

                row_sum += ((2.0 * ux * uy + c1) * (2.0 * vxy + c2))
                    / ((ux * ux + uy * uy + c1) * (vx + vy + c2));
            }
            row_sum
        })
        .sum();

    Ok(total / (rows * cols) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: usize, height: usize) -> PixelImage {
        let mut img = PixelImage::filled(width, height, [0, 0, 0]);
        for row in 0..height {
            for col in 0..width {
                let v = if (row + col) % 2 == 0 { 200 } else { 40 };
                for c in 0..3 {
                    img.set_sample(row, col, c, v);
                }
            }
        }
        img
    }

    #[test]
    fn test_identical_images() {
        let img = checker(12, 9);
        assert_eq!(mse(&img, &img).unwrap(), 0.0);
        assert!(psnr(&img, &img).unwrap().is_infinite());
        assert!((ssim(&img, &img).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_mse_and_psnr_known_values() {
        let a = PixelImage::filled(4, 4, [10, 10, 10]);
        let b = PixelImage::filled(4, 4, [12, 12, 12]);
        assert_eq!(mse(&a, &b).unwrap(), 4.0);
        // 20 * log10(255 / 2)
        let expected = 20.0 * (127.5f64).log10();
        assert!((psnr(&a, &b).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_ssim_drops_for_different_structure() {
        let a = checker(16, 16);
        let b = PixelImage::filled(16, 16, [120, 120, 120]);
        let score = ssim(&a, &b).unwrap();
        assert!(score < 0.5, "ssim {}", score);
    }

    #[test]
    fn test_ssim_high_after_embedding() {
        let mut stego = checker(32, 32);
        let cover = stego.clone();
        let mut framed = b"small".to_vec();
        framed.extend_from_slice(END_MARKER);
        pvd::embed(&mut stego, &framed).unwrap();

        assert!(ssim(&cover, &stego).unwrap() > 0.9);
        assert!(psnr(&cover, &stego).unwrap() > 20.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = PixelImage::filled(8, 8, [0, 0, 0]);
        let b = PixelImage::filled(8, 9, [0, 0, 0]);
        assert!(matches!(mse(&a, &b), Err(StegoError::InvalidInput(_))));
        assert!(ssim(&a, &b).is_err());
    }

    #[test]
    fn test_ssim_needs_full_window() {
        let a = PixelImage::filled(6, 20, [0, 0, 0]);
        assert!(matches!(ssim(&a, &a), Err(StegoError::InvalidInput(_))));
    }

    #[test]
    fn test_capacity_report() {
        let img = PixelImage::filled(8, 4, [50, 50, 50]);
        let report = capacity_report(&img);
        assert_eq!(report.steps, 48);
        assert_eq!(report.total_bits, 144);
        assert_eq!(report.payload_bytes, 18 - END_MARKER.len());

        let tiny = PixelImage::filled(2, 1, [0, 0, 0]);
        assert_eq!(capacity_report(&tiny).payload_bytes, 0);
        assert_eq!(estimated_capacity_bits(10, 10), 250);
    }
}

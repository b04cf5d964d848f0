pub mod io;

use crate::config::CHANNELS;
use crate::error::StegoError;

/// An owned `height × width × 3` grid of 8-bit RGB samples, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelImage {
    width: usize,
    height: usize,
    samples: Vec<u8>,
}

impl PixelImage {
    /// Wrap a raw interleaved RGB buffer. The buffer length must be exactly
    /// `width * height * 3`.
    pub fn from_raw(width: usize, height: usize, samples: Vec<u8>) -> Result<Self, StegoError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or_else(|| StegoError::InvalidInput("image dimensions overflow".into()))?;
        if samples.len() != expected {
            return Err(StegoError::InvalidInput(format!(
                "expected {} RGB samples for {}x{}, got {}",
                expected,
                width,
                height,
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// An image where every pixel has the same colour.
    pub fn filled(width: usize, height: usize, rgb: [u8; CHANNELS]) -> Self {
        let samples = rgb
            .iter()
            .copied()
            .cycle()
            .take(width * height * CHANNELS)
            .collect();
        Self {
            width,
            height,
            samples,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Flat index of sample `(row, col, channel)`.
    #[inline]
    pub fn index(&self, row: usize, col: usize, channel: usize) -> usize {
        (row * self.width + col) * CHANNELS + channel
    }

    #[inline]
    pub fn sample(&self, row: usize, col: usize, channel: usize) -> u8 {
        self.samples[self.index(row, col, channel)]
    }

    #[inline]
    pub fn set_sample(&mut self, row: usize, col: usize, channel: usize, value: u8) {
        let idx = self.index(row, col, channel);
        self.samples[idx] = value;
    }

    pub fn pixel(&self, row: usize, col: usize) -> [u8; CHANNELS] {
        let idx = self.index(row, col, 0);
        [self.samples[idx], self.samples[idx + 1], self.samples[idx + 2]]
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.samples
    }

    /// One row of interleaved samples.
    pub fn row(&self, row: usize) -> &[u8] {
        let start = self.index(row, 0, 0);
        &self.samples[start..start + self.width * CHANNELS]
    }

    pub fn same_dimensions(&self, other: &PixelImage) -> bool {
        self.width == other.width && self.height == other.height
    }
}

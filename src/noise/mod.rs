use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::CHANNELS;
use crate::pvd::cursor::PairCursor;
use crate::raster::PixelImage;

/// Samples that already carry the payload and must not be touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    /// Length in bytes of the framed payload.
    pub payload_len: usize,
    /// Leading cursor steps holding payload bits.
    pub steps_used: usize,
}

/// Post-embedding perturbation of the pixels that carry no payload.
pub trait NoiseInjector {
    /// Perturb `image` with the given intensity, leaving the reserved steps
    /// untouched. Returns the number of samples changed.
    fn inject(&self, image: &mut PixelImage, level: u8, reserved: &Reservation) -> usize;
}

/// Leaves the image as is.
pub struct NoNoise;

impl NoiseInjector for NoNoise {
    fn inject(&self, _image: &mut PixelImage, _level: u8, _reserved: &Reservation) -> usize {
        0
    }
}

/// Adds a uniform offset in `-level..=level` to every free sample.
///
/// Free samples are those of cursor steps after the payload and the unpaired
/// last column of odd-width images.
#[derive(Debug, Clone, Default)]
pub struct UniformNoise {
    seed: Option<u64>,
}

impl UniformNoise {
    pub fn new() -> Self {
        Self { seed: None }
    }

    /// Deterministic noise for reproducible output.
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl NoiseInjector for UniformNoise {
    fn inject(&self, image: &mut PixelImage, level: u8, reserved: &Reservation) -> usize {
        if level == 0 {
            return 0;
        }

        let mut rng = self.rng();
        let mut changed = 0usize;

        let free_steps = PairCursor::new(image.width(), image.height()).skip(reserved.steps_used);
        for step in free_steps {
            changed += perturb(image, &mut rng, level, step.row, step.col, step.channel);
            changed += perturb(image, &mut rng, level, step.row, step.partner_col(), step.channel);
        }

        if image.width() % 2 == 1 {
            let last = image.width() - 1;
            for row in 0..image.height() {
                for channel in 0..CHANNELS {
                    changed += perturb(image, &mut rng, level, row, last, channel);
                }
            }
        }

        debug!(
            "noise level {} changed {} samples ({} payload bytes reserved)",
            level, changed, reserved.payload_len
        );
        changed
    }
}

/// Offset one sample, clamped to the valid range. Returns 1 if it changed.
fn perturb(
    image: &mut PixelImage,
    rng: &mut StdRng,
    level: u8,
    row: usize,
    col: usize,
    channel: usize,
) -> usize {
    let offset: i16 = rng.gen_range(-(level as i16)..=level as i16);
    let old = image.sample(row, col, channel);
    let new = (old as i16 + offset).clamp(0, 255) as u8;
    if new == old {
        return 0;
    }
    image.set_sample(row, col, channel, new);
    1
}

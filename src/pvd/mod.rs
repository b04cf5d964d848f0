//! Pixel-value differencing codec.
//!
//! Each step of the [`PairCursor`] walk looks at two horizontally adjacent
//! samples of one channel. Their absolute difference selects a band of the
//! range table, which fixes how many bits the step carries. Embedding rewrites
//! the pair so that `|p2' - p1'| = floor + value`; extraction recomputes the
//! band from the stego pair and reads `diff - floor` back. Capacity decisions
//! are never recorded, so both walks must run over the same cursor.

pub mod bits;
pub mod cursor;
pub mod range;

use log::debug;

use crate::config::{END_MARKER, MAX_SAMPLE};
use crate::error::StegoError;
use crate::raster::PixelImage;
use bits::{BitReader, ByteAccumulator, MarkerMatcher};
use cursor::PairCursor;

/// Summary of a completed embed walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedReport {
    /// Bits of the framed payload written into the image.
    pub bits_embedded: usize,
    /// Cursor steps that carry payload bits. Steps from this index on are untouched.
    pub steps_used: usize,
    /// Total capacity of the cover image in bits.
    pub capacity_bits: usize,
}

/// Bytes recovered by an extract walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Payload bytes preceding the end marker, or every recovered byte when
    /// no marker was seen.
    pub bytes: Vec<u8>,
    pub marker_found: bool,
    /// Cursor steps read before the walk stopped.
    pub steps_read: usize,
}

/// Exact embedding capacity of `image` in bits. Depends on pixel content.
pub fn capacity_bits(image: &PixelImage) -> usize {
    PairCursor::new(image.width(), image.height())
        .map(|s| {
            let p1 = image.sample(s.row, s.col, s.channel);
            let p2 = image.sample(s.row, s.partner_col(), s.channel);
            range::capacity(p1.abs_diff(p2)).0 as usize
        })
        .sum()
}

/// Recompute a pixel pair so its absolute difference equals `new_diff` while
/// keeping the ordering of `p1` and `p2`.
///
/// When the difference grows, the pixel on the far side moves; when it
/// shrinks, the near side moves. If that pushes a value outside `0..=255`,
/// the pair is translated back into range so the difference stays exact.
///
/// Clamping each pixel on its own would shrink the realised difference and
/// corrupt the embedded value, so near white both pixels may end up lower
/// than a per-pixel clamp would leave them: `adjust_pair(250, 252, 7)` gives
/// `(248, 255)` where clamping would give `(250, 255)`.
pub fn adjust_pair(p1: u8, p2: u8, new_diff: u8) -> (u8, u8) {
    let (a, b) = (p1 as i16, p2 as i16);
    let target = new_diff as i16;
    let diff = (b - a).abs();

    let (mut n1, mut n2) = if a <= b {
        if target > diff {
            (a, a + target)
        } else {
            (b - target, b)
        }
    } else if target > diff {
        (b + target, b)
    } else {
        (a, a - target)
    };

    // Only growth can leave the range, and only upwards.
    let overshoot = n1.max(n2) - MAX_SAMPLE as i16;
    if overshoot > 0 {
        n1 -= overshoot;
        n2 -= overshoot;
    }

    (n1 as u8, n2 as u8)
}

/// Embed `framed` (payload already carrying its end marker) into `image`.
///
/// Capacity is checked before any sample is written, so on error the image
/// is left exactly as it was.
pub fn embed(image: &mut PixelImage, framed: &[u8]) -> Result<EmbedReport, StegoError> {
    if framed.is_empty() {
        return Err(StegoError::InvalidInput("payload is empty".into()));
    }

    let needed_bits = framed.len() * 8;
    let available_bits = capacity_bits(image);
    if needed_bits > available_bits {
        return Err(StegoError::CapacityExceeded {
            needed_bits,
            available_bits,
        });
    }

    let mut reader = BitReader::new(framed);
    let mut steps_used = 0usize;

    for step in PairCursor::new(image.width(), image.height()) {
        if reader.is_exhausted() {
            break;
        }

        let p1 = image.sample(step.row, step.col, step.channel);
        let p2 = image.sample(step.row, step.partner_col(), step.channel);
        let (width, floor) = range::capacity(p1.abs_diff(p2));

        let Some(value) = reader.read(width) else {
            break;
        };
        let (n1, n2) = adjust_pair(p1, p2, floor + value);

        image.set_sample(step.row, step.col, step.channel, n1);
        image.set_sample(step.row, step.partner_col(), step.channel, n2);
        steps_used += 1;
    }
    debug_assert_eq!(reader.remaining(), 0, "capacity check let a bit go unembedded");

    debug!(
        "embedded {} bits in {} steps ({} bits available)",
        needed_bits, steps_used, available_bits
    );

    Ok(EmbedReport {
        bits_embedded: needed_bits,
        steps_used,
        capacity_bits: available_bits,
    })
}

/// Walk the stego image and collect bytes until the end marker is seen.
///
/// The marker check runs after every completed byte and the walk stops on
/// the first match. Running out of pixels without a match is not an error
/// here; [`Extraction::marker_found`] tells the caller.
pub fn extract(image: &PixelImage) -> Extraction {
    let mut acc = ByteAccumulator::new();
    let mut matcher = MarkerMatcher::new(END_MARKER);
    let mut bytes = Vec::new();
    let mut steps_read = 0usize;

    for step in PairCursor::new(image.width(), image.height()) {
        steps_read += 1;
        let p1 = image.sample(step.row, step.col, step.channel);
        let p2 = image.sample(step.row, step.partner_col(), step.channel);
        let diff = p1.abs_diff(p2);
        let (width, floor) = range::capacity(diff);
        let embedded = diff - floor;

        for shift in (0..width).rev() {
            let Some(byte) = acc.push((embedded >> shift) & 1) else {
                continue;
            };
            bytes.push(byte);
            if matcher.push(byte) {
                bytes.truncate(bytes.len() - matcher.pattern_len());
                debug!("end marker found after {} steps", steps_read);
                return Extraction {
                    bytes,
                    marker_found: true,
                    steps_read,
                };
            }
        }
    }

    debug!(
        "pixel grid exhausted after {} steps without end marker ({} bytes, {} trailing bits dropped)",
        steps_read,
        bytes.len(),
        acc.pending_bits()
    );
    Extraction {
        bytes,
        marker_found: false,
        steps_read,
    }
}

/// One band of the difference domain: `[lower, upper]` carries `bits` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeEntry {
    pub lower: u8,
    pub upper: u8,
    pub bits: u8,
}

/// Contiguous bands covering `0..=255`. Smooth regions carry fewer bits than edges.
pub const RANGE_TABLE: [RangeEntry; 6] = [
    RangeEntry { lower: 0, upper: 7, bits: 3 },
    RangeEntry { lower: 8, upper: 15, bits: 3 },
    RangeEntry { lower: 16, upper: 31, bits: 4 },
    RangeEntry { lower: 32, upper: 63, bits: 5 },
    RangeEntry { lower: 64, upper: 127, bits: 6 },
    RangeEntry { lower: 128, upper: 255, bits: 7 },
];

/// Band for an absolute pixel difference.
#[inline]
pub fn classify(diff: u8) -> &'static RangeEntry {
    let idx = match diff {
        0..=7 => 0,
        8..=15 => 1,
        16..=31 => 2,
        32..=63 => 3,
        64..=127 => 4,
        _ => 5,
    };
    &RANGE_TABLE[idx]
}

/// `(bit capacity, range floor)` for an absolute pixel difference.
#[inline]
pub fn capacity(diff: u8) -> (u8, u8) {
    let entry = classify(diff);
    (entry.bits, entry.lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_total_and_disjoint() {
        for d in 0..=255u8 {
            let hits = RANGE_TABLE
                .iter()
                .filter(|e| e.lower <= d && d <= e.upper)
                .count();
            assert_eq!(hits, 1, "diff {} classified {} times", d, hits);

            let entry = classify(d);
            assert!(entry.lower <= d && d <= entry.upper);
        }
    }

    #[test]
    fn test_bands_are_contiguous() {
        assert_eq!(RANGE_TABLE[0].lower, 0);
        assert_eq!(RANGE_TABLE[RANGE_TABLE.len() - 1].upper, 255);
        for pair in RANGE_TABLE.windows(2) {
            assert_eq!(pair[0].upper as u16 + 1, pair[1].lower as u16);
        }
    }

    #[test]
    fn test_capacities() {
        let bits: Vec<u8> = RANGE_TABLE.iter().map(|e| e.bits).collect();
        assert_eq!(bits, vec![3, 3, 4, 5, 6, 7]);

        assert_eq!(capacity(0), (3, 0));
        assert_eq!(capacity(15), (3, 8));
        assert_eq!(capacity(16), (4, 16));
        assert_eq!(capacity(100), (6, 64));
        assert_eq!(capacity(255), (7, 128));
    }

    #[test]
    fn test_every_band_fits_its_bits() {
        // Any embedded value keeps the new difference inside the same band.
        for e in &RANGE_TABLE {
            let width = e.upper as u16 - e.lower as u16 + 1;
            assert_eq!(width, 1u16 << e.bits);
        }
    }
}

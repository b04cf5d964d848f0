/// Reads a byte slice as an MSB-first bitstream in variable-width chunks.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn total_bits(&self) -> usize {
        self.data.len() * 8
    }

    pub fn remaining(&self) -> usize {
        self.total_bits() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.total_bits()
    }

    /// Take the next `width` bits (at most 8) as a big-endian integer.
    /// A short final chunk is padded with zeros on the right.
    /// Returns `None` once every bit has been consumed.
    pub fn read(&mut self, width: u8) -> Option<u8> {
        debug_assert!(width <= 8);
        if self.is_exhausted() {
            return None;
        }

        let total = self.total_bits();
        let mut value = 0u8;
        for _ in 0..width {
            value <<= 1;
            if self.pos < total {
                let byte = self.data[self.pos / 8];
                value |= (byte >> (7 - self.pos % 8)) & 1;
                self.pos += 1;
            }
        }
        Some(value)
    }
}

/// Collects bits MSB-first and emits a byte every 8 bits.
#[derive(Debug, Clone, Default)]
pub struct ByteAccumulator {
    current: u8,
    count: u8,
}

impl ByteAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift in one bit. Returns the completed byte on every eighth bit,
    /// `None` while a byte is still being assembled.
    #[inline]
    pub fn push(&mut self, bit: u8) -> Option<u8> {
        self.current = (self.current << 1) | (bit & 1);
        self.count += 1;
        if self.count == 8 {
            let byte = self.current;
            self.current = 0;
            self.count = 0;
            Some(byte)
        } else {
            None
        }
    }

    /// Bits waiting for a full byte. They are never emitted.
    pub fn pending_bits(&self) -> u8 {
        self.count
    }
}

/// Streaming KMP matcher. Fed one byte at a time, it reports a match on the
/// byte that completes the first occurrence of the pattern in the stream.
#[derive(Debug, Clone)]
pub struct MarkerMatcher<'p> {
    pattern: &'p [u8],
    failure: Vec<usize>,
    matched: usize,
}

impl<'p> MarkerMatcher<'p> {
    pub fn new(pattern: &'p [u8]) -> Self {
        let mut failure = vec![0usize; pattern.len()];
        let mut k = 0;
        for i in 1..pattern.len() {
            while k > 0 && pattern[i] != pattern[k] {
                k = failure[k - 1];
            }
            if pattern[i] == pattern[k] {
                k += 1;
            }
            failure[i] = k;
        }
        Self {
            pattern,
            failure,
            matched: 0,
        }
    }

    pub fn pattern_len(&self) -> usize {
        self.pattern.len()
    }

    /// Feed the next byte; `true` when the pattern ends at this byte.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.pattern.is_empty() {
            return true;
        }
        if self.matched == self.pattern.len() {
            self.matched = self.failure[self.matched - 1];
        }
        while self.matched > 0 && byte != self.pattern[self.matched] {
            self.matched = self.failure[self.matched - 1];
        }
        if byte == self.pattern[self.matched] {
            self.matched += 1;
        }
        self.matched == self.pattern.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_variable_widths() {
        // 0b1011_0010, 0b1111_0000
        let data = [0xB2, 0xF0];
        let mut r = BitReader::new(&data);
        assert_eq!(r.read(3), Some(0b101));
        assert_eq!(r.read(4), Some(0b1001));
        assert_eq!(r.read(7), Some(0b0_1111_00));
        assert_eq!(r.remaining(), 2);
        // short final chunk: "00" padded right to "00000"
        assert_eq!(r.read(5), Some(0));
        assert!(r.is_exhausted());
        assert_eq!(r.read(3), None);
    }

    #[test]
    fn test_reader_pads_final_chunk_msb_aligned() {
        // last bit is 1, read with width 3 => 0b100
        let data = [0x01];
        let mut r = BitReader::new(&data);
        assert_eq!(r.read(7), Some(0));
        assert_eq!(r.read(3), Some(0b100));
    }

    #[test]
    fn test_accumulator_emits_every_eight_bits() {
        let mut acc = ByteAccumulator::new();
        let bits = [0, 1, 0, 0, 1, 0, 0, 0];
        let mut out = Vec::new();
        for b in bits {
            if let Some(byte) = acc.push(b) {
                out.push(byte);
            }
        }
        assert_eq!(out, vec![b'H']);
        assert_eq!(acc.pending_bits(), 0);

        acc.push(1);
        acc.push(1);
        assert_eq!(acc.pending_bits(), 2);
    }

    fn first_match_end(pattern: &[u8], stream: &[u8]) -> Option<usize> {
        let mut m = MarkerMatcher::new(pattern);
        stream.iter().position(|&b| m.push(b)).map(|i| i + 1)
    }

    #[test]
    fn test_matcher_agrees_with_whole_buffer_search() {
        let marker = b"###END###";
        let streams: [&[u8]; 5] = [
            b"hello###END###",
            b"####END###",
            b"##END## ###EN###END###tail",
            b"###END##",
            b"a###END###b###END###",
        ];
        for s in streams {
            let expected = s
                .windows(marker.len())
                .position(|w| w == marker)
                .map(|p| p + marker.len());
            assert_eq!(first_match_end(marker, s), expected, "stream {:?}", s);
        }
    }

    #[test]
    fn test_partial_marker_does_not_match() {
        assert_eq!(first_match_end(b"###END###", b"###END## ###EN"), None);
    }
}

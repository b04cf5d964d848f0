use crate::config::CHANNELS;

/// One embedding step: the samples `(row, col, channel)` and `(row, col + 1, channel)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairStep {
    pub row: usize,
    pub col: usize,
    pub channel: usize,
}

impl PairStep {
    /// Column of the second pixel in the pair.
    pub fn partner_col(&self) -> usize {
        self.col + 1
    }
}

/// The single traversal order shared by embed and extract: channels first,
/// then column pairs `0, 2, 4, ..`, then rows. An odd trailing column is never
/// visited.
#[derive(Debug, Clone)]
pub struct PairCursor {
    pairs_per_row: usize,
    total: usize,
    next: usize,
}

impl PairCursor {
    pub fn new(width: usize, height: usize) -> Self {
        let pairs_per_row = width / 2;
        Self {
            pairs_per_row,
            total: pairs_per_row * height * CHANNELS,
            next: 0,
        }
    }

    /// Total number of steps in a `width × height` image.
    pub fn total_steps(width: usize, height: usize) -> usize {
        (width / 2) * height * CHANNELS
    }

    fn step_at(&self, index: usize) -> PairStep {
        let channel = index % CHANNELS;
        let pair = index / CHANNELS;
        PairStep {
            row: pair / self.pairs_per_row,
            col: (pair % self.pairs_per_row) * 2,
            channel,
        }
    }
}

impl Iterator for PairCursor {
    type Item = PairStep;

    fn next(&mut self) -> Option<PairStep> {
        if self.next >= self.total {
            return None;
        }
        let step = self.step_at(self.next);
        self.next += 1;
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.next;
        (left, Some(left))
    }

    fn nth(&mut self, n: usize) -> Option<PairStep> {
        self.next = self.next.saturating_add(n).min(self.total);
        self.next()
    }
}

impl ExactSizeIterator for PairCursor {}

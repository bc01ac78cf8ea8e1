//! Block-size policy for streamed contractions

/// Number of rows that fit in `byte_budget` when one row holds
/// `elements_per_row` elements of `element_size` bytes. Never returns fewer
/// than two rows, so a loop always makes progress even with no budget left.
pub fn choose_block_size(byte_budget: f64, element_size: usize, elements_per_row: usize) -> usize {
    let row_bytes = (element_size * elements_per_row).max(1) as f64;
    let rows = (byte_budget.max(0.0) / row_bytes).floor();
    // float -> usize casts saturate, so an enormous budget is still well defined
    (rows as usize).max(2)
}

/// Half-open ranges `[p0, p1)` covering `start..stop` in steps of `step`.
#[derive(Debug, Clone)]
pub struct BlockRange {
    next: usize,
    stop: usize,
    step: usize,
}

impl BlockRange {
    pub fn new(start: usize, stop: usize, step: usize) -> Self {
        assert!(step > 0, "block step must be positive");
        BlockRange {
            next: start,
            stop,
            step,
        }
    }
}

impl Iterator for BlockRange {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.stop {
            return None;
        }
        let p0 = self.next;
        let p1 = p0.saturating_add(self.step).min(self.stop);
        self.next = p1;
        Some((p0, p1))
    }
}

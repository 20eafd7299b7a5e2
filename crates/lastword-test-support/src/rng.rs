//! Test RNG — deterministic `DeterministicRng` implementation for tests.

use lastword_core::rng::DeterministicRng;

/// An RNG that replays a predetermined sequence. Values are folded into the
/// requested range, so scripts can use small integers without caring about
/// each call site's bounds (shuffles ask for a different range every swap).
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
    cycle: bool,
}

impl SequenceRng {
    /// Creates an RNG that panics when the sequence is exhausted. Use for
    /// tests that assert on the exact number of draws.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self {
            values,
            index: 0,
            cycle: false,
        }
    }

    /// Creates an RNG that wraps around when the sequence is exhausted.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    #[must_use]
    pub fn cycling(values: Vec<u32>) -> Self {
        assert!(!values.is_empty(), "cycling SequenceRng needs at least one value");
        Self {
            values,
            index: 0,
            cycle: true,
        }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        if self.cycle {
            self.index %= self.values.len();
        }
        let raw = self.values[self.index];
        self.index += 1;
        min + raw % (max - min + 1)
    }
}

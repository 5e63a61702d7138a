// Seedable pseudo-random number generator for the emoji garden.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding,
// plus the handful of sampling helpers the garden's creatures lean on:
// probability rolls (`chance`), uniform ranges, headings (`angle`) and
// symmetric positional noise (`jitter`).
//
// The simulation owns exactly one `GardenRng`. Every behavioral coin flip
// (a butterfly deciding to rest, a bush rolling for a new butterfly, a nest
// picking its hatch time) draws from that single stream, so two gardens
// built from the same seed and fed the same commands evolve identically.
//
// **Critical constraint: determinism.** The core generator uses integer
// arithmetic only. Float helpers derive from `next_u64` through fixed bit
// shifts, so their output is stable across platforms.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG, the garden's sole source of randomness.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GardenRng {
    s: [u64; 4],
}

impl GardenRng {
    /// Create a new generator seeded from a `u64`.
    ///
    /// SplitMix64 expands the seed into the 256-bit state, so nearby seeds
    /// (42, 43, ...) still produce unrelated streams.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform `f32` in [0, 1), built from the upper 24 bits.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform `f64` in [0, 1), built from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Return `true` with probability `p`.
    ///
    /// `p <= 0.0` never fires and `p >= 1.0` always fires, which lets config
    /// authors switch a behavior off or force it on without special cases.
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Uniform value in `[low, high)`.
    ///
    /// A degenerate range (`low == high`) returns `low`; the draw is still
    /// consumed so the stream position does not depend on config values.
    /// Panics if `low > high`.
    pub fn range_f32(&mut self, low: f32, high: f32) -> f32 {
        assert!(low <= high, "range_f32: low must not exceed high");
        low + self.next_f32() * (high - low)
    }

    /// Uniform integer in `[low, high)`, rejection-sampled to avoid modulo
    /// bias. Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        let threshold = range.wrapping_neg() % range;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Uniform integer in `[low, high]` (both ends inclusive).
    /// Panics if `low > high`.
    pub fn range_u64_inclusive(&mut self, low: u64, high: u64) -> u64 {
        assert!(low <= high, "range_u64_inclusive: low must be <= high");
        match high.checked_add(1) {
            Some(end) => self.range_u64(low, end),
            // `[low, u64::MAX]`: the span `high - low + 1` may itself wrap.
            None => match (high - low).checked_add(1) {
                Some(span) => low + self.range_u64(0, span),
                None => self.next_u64(),
            },
        }
    }

    /// A heading in radians, uniform in `[0, 2π)`.
    pub fn angle(&mut self) -> f32 {
        self.next_f32() * std::f32::consts::TAU
    }

    /// Symmetric noise in `[-magnitude, magnitude)`.
    pub fn jitter(&mut self, magnitude: f32) -> f32 {
        (self.next_f32() * 2.0 - 1.0) * magnitude
    }
}

/// SplitMix64, used only to expand a `u64` seed into xoshiro state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

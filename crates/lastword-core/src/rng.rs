//! Random number generator abstraction for determinism.
//!
//! Target-ring shuffles, word draws, and room-code generation all consume
//! randomness through this trait. In production it wraps a real RNG; tests
//! inject a seeded or scripted implementation.

/// Abstraction over random number generation.
pub trait DeterministicRng: Send {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;
}

/// Production RNG backed by the `rand` crate's thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRng;

impl DeterministicRng for SystemRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        rand::Rng::random_range(&mut rand::rng(), min..=max)
    }
}

//! Room join-code generation.

use lastword_core::rng::DeterministicRng;

/// Length of a room join code.
pub const CODE_LENGTH: usize = 6;

/// Uppercase alphanumerics minus the ambiguous 0/O/1/I.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Draws a fresh join code. Uniqueness is the caller's problem: the store
/// rejects collisions and the caller draws again.
#[allow(clippy::cast_possible_truncation)]
pub fn generate_code(rng: &mut dyn DeterministicRng) -> String {
    (0..CODE_LENGTH)
        .map(|_| {
            let i = rng.next_u32_range(0, CODE_ALPHABET.len() as u32 - 1) as usize;
            char::from(CODE_ALPHABET[i])
        })
        .collect()
}

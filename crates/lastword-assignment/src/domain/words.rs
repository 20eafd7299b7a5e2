//! Word-triple construction from a room's word pool.

use lastword_core::model::{WORDS_PER_PLAYER, Word, WordTriple};
use lastword_core::rng::DeterministicRng;

use super::ring::shuffle;

/// Shuffles a room's pool words and chunks them into triples. Leftover words
/// (fewer than three) are dropped.
#[must_use]
pub fn build_triples(mut words: Vec<Word>, rng: &mut dyn DeterministicRng) -> Vec<WordTriple> {
    shuffle(&mut words, rng);
    words
        .chunks_exact(WORDS_PER_PLAYER)
        .map(|chunk| WordTriple::new(chunk[0].text.clone(), chunk[1].text.clone(), chunk[2].text.clone()))
        .collect()
}

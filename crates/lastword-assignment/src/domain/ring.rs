//! Single-cycle target ring construction.
//!
//! The ring is a uniformly random single-cycle derangement: shuffle the
//! players, point each at the next in shuffled order, wrap around. That
//! guarantees no self-target and exactly one incoming and outgoing edge per
//! player.

use std::collections::HashMap;

use lastword_core::error::GameError;
use lastword_core::model::{Player, WordTriple, alive_joined};
use lastword_core::rng::DeterministicRng;
use lastword_core::store::TargetAssignment;
use uuid::Uuid;

/// In-place Fisher–Yates shuffle driven by the injected RNG.
#[allow(clippy::cast_possible_truncation)]
pub fn shuffle<T>(items: &mut [T], rng: &mut dyn DeterministicRng) {
    for i in (1..items.len()).rev() {
        let j = rng.next_u32_range(0, i as u32) as usize;
        items.swap(i, j);
    }
}

/// Builds a fresh ring over `player_ids`, distributing `triples` one-to-one.
///
/// Both the player order and the triple order are shuffled, so repeated
/// calls over the same roster yield independent rings.
///
/// # Errors
///
/// Returns `GameError::Validation` if fewer than two players are given or
/// there are not enough triples to cover them.
pub fn assign(
    player_ids: &[Uuid],
    triples: &[WordTriple],
    rng: &mut dyn DeterministicRng,
) -> Result<Vec<TargetAssignment>, GameError> {
    if player_ids.len() < 2 {
        return Err(GameError::Validation(format!(
            "cannot build a target ring over {} player(s)",
            player_ids.len()
        )));
    }
    if triples.len() < player_ids.len() {
        return Err(GameError::Validation(format!(
            "{} word triples cannot cover {} players",
            triples.len(),
            player_ids.len()
        )));
    }

    let mut order: Vec<Uuid> = player_ids.to_vec();
    shuffle(&mut order, rng);

    let mut deck: Vec<WordTriple> = triples.to_vec();
    shuffle(&mut deck, rng);

    let assignments = order
        .iter()
        .enumerate()
        .map(|(i, &player_id)| TargetAssignment {
            player_id,
            target_id: order[(i + 1) % order.len()],
            words: deck[i].clone(),
        })
        .collect();

    Ok(assignments)
}

/// Checks the ring invariant over a roster: the alive+joined players' target
/// edges form exactly one cycle covering that set, with no self-loops and no
/// edge into an eliminated or departed player.
#[must_use]
pub fn ring_is_valid(players: &[Player]) -> bool {
    let ring = alive_joined(players);
    if ring.len() < 2 {
        // A ring needs at least two nodes; the game should already be over.
        return ring.is_empty() || ring[0].target.is_none();
    }

    let by_id: HashMap<Uuid, &Player> = ring.iter().map(|p| (p.id, *p)).collect();
    for player in &ring {
        match player.target {
            Some(target) if target != player.id && by_id.contains_key(&target) => {}
            _ => return false,
        }
    }

    // Walk the cycle from an arbitrary node: it must visit every node in the
    // set exactly once before returning to the start. A roster split into
    // several smaller cycles closes early and visits fewer nodes.
    let start = ring[0].id;
    let mut visited = std::collections::HashSet::new();
    let mut current = start;
    while visited.insert(current) {
        match by_id[&current].target {
            Some(next) => current = next,
            None => return false,
        }
    }
    current == start && visited.len() == ring.len()
}

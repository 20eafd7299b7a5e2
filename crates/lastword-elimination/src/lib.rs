//! Elimination protocol and win finalizer.
//!
//! A killer claims their target with an [`EliminationClaim`]; the target
//! confirms or disputes. Acceptance eliminates the target, hands their ring
//! edge and word triple to the killer, and, when one player remains, crowns
//! the winner and settles lifetime stats.
//!
//! [`EliminationClaim`]: lastword_core::model::EliminationClaim

pub mod application;
pub mod domain;

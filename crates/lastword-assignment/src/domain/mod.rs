//! Domain logic for target assignment.

pub mod ring;
pub mod words;

//! Domain logic for the room lifecycle.

pub mod code;
pub mod commands;

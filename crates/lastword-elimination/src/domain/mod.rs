//! Domain types for the elimination protocol.

pub mod commands;

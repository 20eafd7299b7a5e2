//! Application-level handlers for target assignment.

pub mod command_handlers;

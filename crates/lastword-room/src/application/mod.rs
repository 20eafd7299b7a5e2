//! Application-level handlers for the room lifecycle.

pub mod command_handlers;
pub mod query_handlers;
pub mod sweeper;

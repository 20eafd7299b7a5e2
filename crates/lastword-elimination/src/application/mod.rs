//! Application-level handlers for eliminations and game finalization.

pub mod command_handlers;
pub mod finalizer;

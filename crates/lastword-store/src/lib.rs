//! Lastword — `GameStore` implementations.
//!
//! `MemoryStore` serves tests and standalone runs; `PgStore` is the
//! production PostgreSQL store. Both enforce the same compare-and-set
//! semantics: preconditions are re-checked at commit and a violated one
//! fails `StateConflict` with nothing applied.

pub mod memory;
pub mod pg;
pub mod schema;

pub use memory::MemoryStore;
pub use pg::PgStore;

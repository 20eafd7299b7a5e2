//! Lastword — Room Lifecycle Manager.
//!
//! Responsible for room creation, join/invite/leave bookkeeping, the start
//! transition, room-state queries, and the expiration sweep.

pub mod application;
pub mod domain;

//! Route modules organized by bounded context.

pub mod eliminations;
pub mod health;
pub mod rooms;
pub mod users;

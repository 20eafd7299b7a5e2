//! Axum HTTP API for the Lastword game server.

pub mod auth;
pub mod error;
pub mod notify;
pub mod routes;
pub mod state;

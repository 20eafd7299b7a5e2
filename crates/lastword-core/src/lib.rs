//! Lastword Core — shared domain abstractions.
//!
//! This crate defines the data model, error taxonomy, and traits that all
//! game contexts depend on. It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod identity;
pub mod log;
pub mod model;
pub mod notify;
pub mod rng;
pub mod store;

//! Lastword — Target Assignment Engine.
//!
//! Builds and rebuilds the cyclic who-eliminates-whom ring and distributes
//! word triples over it.

pub mod application;
pub mod domain;

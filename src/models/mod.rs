// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod coordinate;
pub mod place;
pub mod route;

pub use coordinate::*;
pub use place::*;
pub use route::*;

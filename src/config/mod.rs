// src/config/mod.rs
// DOCUMENTATION: Configuration module organization
// PURPOSE: Re-export configuration components

pub mod cache;
pub mod env;

pub use cache::GeoCacheConfig;
pub use env::Config;

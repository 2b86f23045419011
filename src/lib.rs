// src/lib.rs
// DOCUMENTATION: Library root
// PURPOSE: Expose the geo-query cache, helpers and HTTP handlers to the binary and tests

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;

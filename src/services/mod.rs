// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod distance;
pub mod geo_query_cache;
pub mod geolocation;
pub mod google_places_client;
pub mod provider;
pub mod taxonomy;
pub mod walk;

pub use distance::*;
pub use geo_query_cache::*;
pub use geolocation::*;
pub use google_places_client::*;
pub use provider::*;
pub use taxonomy::*;
pub use walk::*;

//! Reload Match - expanding-radius reload matching for trucks
//!
//! Given the ZIP where a truck delivers, finds reload freight whose pickup
//! lies within a search radius, widening the radius step by step up to a
//! cap. Distances are great-circle miles between ZIP centroids.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Matcher, SearchRadius, Geocoder, LoadSource, distance::distance_miles, matcher::find_reload_matches};
pub use crate::models::{GeoPoint, LoadRecord, MatchResult, SearchOutcome, SearchStatus};

// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod sources;

pub use distance::{distance_miles, EARTH_RADIUS_MILES};
pub use filters::{resolve_candidates, within_radius, ResolvedCandidate};
pub use matcher::{find_reload_matches, Matcher, RadiusError, SearchRadius};
pub use sources::{Geocoder, LoadSource};

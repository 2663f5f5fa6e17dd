// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{GeoPoint, LoadRecord, MatchResult, SearchStatus, SearchOutcome};
pub use requests::FindReloadsRequest;
pub use responses::{FindReloadsResponse, ReloadMatch, LoadsResponse, HealthResponse, ErrorResponse};

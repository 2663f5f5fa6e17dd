use crate::core::distance::distance_miles;
use crate::core::sources::Geocoder;
use crate::models::{GeoPoint, LoadRecord, MatchResult};

/// A candidate load with its pickup point already geocoded
#[derive(Debug, Clone, Copy)]
pub struct ResolvedCandidate<'a> {
    pub load: &'a LoadRecord,
    pub pickup: GeoPoint,
    pub deadhead_miles: f64,
}

/// Geocode each candidate's pickup ZIP and measure it from the origin
///
/// Candidates whose pickup ZIP is unknown are dropped here and never
/// reach the radius filter.
pub fn resolve_candidates<'a, G>(
    origin: GeoPoint,
    candidates: &'a [LoadRecord],
    geocoder: &G,
) -> Vec<ResolvedCandidate<'a>>
where
    G: Geocoder + ?Sized,
{
    candidates
        .iter()
        .filter_map(|load| match geocoder.locate(&load.pickup_zip) {
            Some(pickup) => Some(ResolvedCandidate {
                load,
                pickup,
                deadhead_miles: distance_miles(origin, pickup),
            }),
            None => {
                tracing::trace!("Skipping load {}: unknown pickup ZIP {}", load.load_id, load.pickup_zip);
                None
            }
        })
        .collect()
}

/// Collect every resolved candidate within `radius_miles` of the origin
pub fn within_radius(
    resolved: &[ResolvedCandidate<'_>],
    radius_miles: f64,
) -> Vec<MatchResult> {
    resolved
        .iter()
        .filter(|candidate| candidate.deadhead_miles <= radius_miles)
        .map(|candidate| MatchResult {
            load: candidate.load.clone(),
            deadhead_miles: round_deadhead(candidate.deadhead_miles, radius_miles),
        })
        .collect()
}

/// Round to one decimal place without ever reporting more than the radius
#[inline]
fn round_deadhead(miles: f64, radius_miles: f64) -> f64 {
    ((miles * 10.0).round() / 10.0).min(radius_miles)
}

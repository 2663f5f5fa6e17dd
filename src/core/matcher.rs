use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::models::{LoadRecord, MatchResult, SearchOutcome, SearchStatus};
use crate::core::{
    filters::{resolve_candidates, within_radius},
    sources::Geocoder,
};

pub const DEFAULT_START_RADIUS_MILES: f64 = 100.0;
pub const DEFAULT_RADIUS_STEP_MILES: f64 = 50.0;
pub const DEFAULT_MAX_RADIUS_MILES: f64 = 300.0;

/// Errors for an unusable radius schedule
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RadiusError {
    #[error("Radius values must be finite numbers")]
    NotFinite,

    #[error("Start radius must be positive, got {0}")]
    NonPositiveStart(f64),

    #[error("Radius step must be positive, got {0}")]
    NonPositiveStep(f64),

    #[error("Max radius must be positive, got {0}")]
    NonPositiveMax(f64),
}

/// Radius schedule for an expanding search, in miles
///
/// Only constructible through [`SearchRadius::new`], which guarantees the
/// search loop terminates. The radius grows by whole steps, so the last
/// radius tried can land past `max`. A `max` below `start` is allowed and
/// means exactly one radius is searched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchRadius {
    start: f64,
    step: f64,
    max: f64,
}

impl SearchRadius {
    pub fn new(start: f64, step: f64, max: f64) -> Result<Self, RadiusError> {
        if !(start.is_finite() && step.is_finite() && max.is_finite()) {
            return Err(RadiusError::NotFinite);
        }
        if start <= 0.0 {
            return Err(RadiusError::NonPositiveStart(start));
        }
        if step <= 0.0 {
            return Err(RadiusError::NonPositiveStep(step));
        }
        if max <= 0.0 {
            return Err(RadiusError::NonPositiveMax(max));
        }

        Ok(Self { start, step, max })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Copy of this schedule with per-request overrides applied
    pub fn with_overrides(
        &self,
        start: Option<f64>,
        step: Option<f64>,
        max: Option<f64>,
    ) -> Result<Self, RadiusError> {
        Self::new(
            start.unwrap_or(self.start),
            step.unwrap_or(self.step),
            max.unwrap_or(self.max),
        )
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_RADIUS_MILES,
            step: DEFAULT_RADIUS_STEP_MILES,
            max: DEFAULT_MAX_RADIUS_MILES,
        }
    }
}

impl<'de> Deserialize<'de> for SearchRadius {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            start: f64,
            step: f64,
            max: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.start, raw.step, raw.max).map_err(serde::de::Error::custom)
    }
}

/// Find reload matches around `origin_zip`, widening the radius until
/// something is found or the maximum radius is reached
///
/// # Arguments
/// * `origin_zip` - ZIP where the truck delivers
/// * `candidates` - Loads to consider
/// * `geocoder` - ZIP to centroid lookup for origin and pickups
/// * `radius` - Start, step and cap of the search
///
/// # Returns
/// SearchOutcome with the radius the matches were found at, sorted by
/// ascending deadhead. An unknown origin returns `UnknownOrigin` at the
/// start radius without touching any candidate.
pub fn find_reload_matches<G>(
    origin_zip: &str,
    candidates: &[LoadRecord],
    geocoder: &G,
    radius: &SearchRadius,
) -> SearchOutcome
where
    G: Geocoder + ?Sized,
{
    let Some(origin) = geocoder.locate(origin_zip) else {
        tracing::debug!("Origin ZIP {} has no known centroid", origin_zip);
        return SearchOutcome::unknown_origin(radius.start);
    };

    // Geocode and measure once per query, then reuse across radii
    let resolved = resolve_candidates(origin, candidates, geocoder);
    let candidates_evaluated = resolved.len();

    let mut current = radius.start;
    loop {
        let mut matches = within_radius(&resolved, current);

        tracing::debug!(
            "Radius {} mi around {}: {} of {} candidates",
            current,
            origin_zip,
            matches.len(),
            candidates_evaluated
        );

        if !matches.is_empty() {
            sort_by_deadhead(&mut matches);
            return SearchOutcome {
                status: SearchStatus::Found,
                radius_miles: current,
                matches,
                candidates_evaluated,
            };
        }

        if current >= radius.max {
            return SearchOutcome {
                status: SearchStatus::Exhausted,
                radius_miles: radius.max,
                matches,
                candidates_evaluated,
            };
        }

        current += radius.step;
    }
}

/// Sort by deadhead (ascending), ties broken by load id
fn sort_by_deadhead(matches: &mut [MatchResult]) {
    matches.sort_by(|a, b| {
        a.deadhead_miles
            .partial_cmp(&b.deadhead_miles)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.load.load_id.cmp(&b.load.load_id))
    });
}

/// Reload matcher bound to a configured radius schedule
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    radius: SearchRadius,
}

impl Matcher {
    pub fn new(radius: SearchRadius) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> &SearchRadius {
        &self.radius
    }

    /// Find matches using the configured radius schedule
    pub fn find_matches<G>(
        &self,
        origin_zip: &str,
        candidates: &[LoadRecord],
        geocoder: &G,
    ) -> SearchOutcome
    where
        G: Geocoder + ?Sized,
    {
        find_reload_matches(origin_zip, candidates, geocoder, &self.radius)
    }
}

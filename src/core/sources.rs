use std::collections::HashMap;
use crate::models::{GeoPoint, LoadRecord};

/// ZIP to centroid lookup
///
/// An unknown ZIP is `None`, never an error.
pub trait Geocoder {
    fn locate(&self, zip: &str) -> Option<GeoPoint>;
}

/// Anything that can enumerate available loads
pub trait LoadSource {
    fn loads(&self) -> &[LoadRecord];
}

impl Geocoder for HashMap<String, GeoPoint> {
    fn locate(&self, zip: &str) -> Option<GeoPoint> {
        self.get(zip).copied()
    }
}

impl<F> Geocoder for F
where
    F: Fn(&str) -> Option<GeoPoint>,
{
    fn locate(&self, zip: &str) -> Option<GeoPoint> {
        self(zip)
    }
}

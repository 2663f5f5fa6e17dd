use crate::core::{Geocoder, LoadSource};
use crate::models::{GeoPoint, LoadRecord};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a dataset
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid dataset: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Duplicate load id: {0}")]
    DuplicateLoad(String),
}

/// Static ZIP centroid table
#[derive(Debug, Clone, Default)]
pub struct ZipTable {
    points: HashMap<String, GeoPoint>,
}

impl ZipTable {
    pub fn new(points: HashMap<String, GeoPoint>) -> Self {
        Self { points }
    }

    /// The six demo ZIPs around the Gulf coast and Georgia
    pub fn sample() -> Self {
        let points = [
            ("36602", GeoPoint::new(30.6944, -88.0431)), // Mobile, AL
            ("36532", GeoPoint::new(30.5224, -87.9036)), // Fairhope, AL
            ("36603", GeoPoint::new(30.6834, -88.0431)), // Mobile, AL
            ("30301", GeoPoint::new(33.7490, -84.3880)), // Atlanta, GA
            ("31401", GeoPoint::new(32.0809, -81.0912)), // Savannah, GA
            ("35203", GeoPoint::new(33.5186, -86.8104)), // Birmingham, AL
        ];

        Self {
            points: points
                .into_iter()
                .map(|(zip, point)| (zip.to_string(), point))
                .collect(),
        }
    }

    pub fn insert(&mut self, zip: impl Into<String>, point: GeoPoint) {
        self.points.insert(zip.into(), point);
    }

    pub fn contains(&self, zip: &str) -> bool {
        self.points.contains_key(zip)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Geocoder for ZipTable {
    fn locate(&self, zip: &str) -> Option<GeoPoint> {
        self.points.get(zip.trim()).copied()
    }
}

/// In-memory board of available loads
#[derive(Debug, Clone, Default)]
pub struct LoadBoard {
    loads: Vec<LoadRecord>,
}

impl LoadBoard {
    /// Build a board, rejecting duplicate load ids
    pub fn new(loads: Vec<LoadRecord>) -> Result<Self, DataError> {
        let mut seen = HashSet::with_capacity(loads.len());
        for load in &loads {
            if !seen.insert(load.load_id.as_str()) {
                return Err(DataError::DuplicateLoad(load.load_id.clone()));
            }
        }

        Ok(Self { loads })
    }

    /// The three demo loads out of Mobile and Fairhope
    pub fn sample() -> Self {
        let load = |id: &str, zip: &str, pickup: &str, delivery: &str, broker: &str, email: &str, phone: &str, miles: f64| {
            LoadRecord {
                load_id: id.to_string(),
                pickup_zip: zip.to_string(),
                pickup_city: pickup.to_string(),
                delivery_city: delivery.to_string(),
                broker: broker.to_string(),
                broker_email: email.to_string(),
                broker_phone: phone.to_string(),
                trip_miles: miles,
            }
        };

        Self {
            loads: vec![
                load("RL1001", "36602", "Mobile, AL", "Atlanta, GA", "ABC Logistics", "broker1@example.com", "555-123-4567", 345.0),
                load("RL1002", "36532", "Fairhope, AL", "Savannah, GA", "XYZ Freight", "broker2@example.com", "555-987-6543", 420.0),
                load("RL1003", "36603", "Mobile, AL", "Birmingham, AL", "Delta Carriers", "broker3@example.com", "555-654-3210", 260.0),
            ],
        }
    }

    pub fn get(&self, load_id: &str) -> Option<&LoadRecord> {
        self.loads.iter().find(|load| load.load_id == load_id)
    }

    pub fn len(&self) -> usize {
        self.loads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }
}

impl LoadSource for LoadBoard {
    fn loads(&self) -> &[LoadRecord] {
        &self.loads
    }
}

#[derive(Debug, Deserialize)]
struct DatasetFile {
    #[serde(default)]
    zips: HashMap<String, GeoPoint>,
    #[serde(default)]
    loads: Vec<LoadRecord>,
}

/// ZIP table and load board served together
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub zips: ZipTable,
    pub loads: LoadBoard,
}

impl Dataset {
    pub fn sample() -> Self {
        Self {
            zips: ZipTable::sample(),
            loads: LoadBoard::sample(),
        }
    }

    /// Parse a dataset from TOML with a `[zips]` table and `[[loads]]` entries
    pub fn from_toml_str(source: &str) -> Result<Self, DataError> {
        let file: DatasetFile = toml::from_str(source)?;

        Ok(Self {
            zips: ZipTable::new(file.zips),
            loads: LoadBoard::new(file.loads)?,
        })
    }

    /// Load a dataset from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let dataset = Self::from_toml_str(&source)?;

        tracing::info!(
            "Loaded dataset from {}: {} loads, {} ZIPs",
            path.as_ref().display(),
            dataset.loads.len(),
            dataset.zips.len()
        );

        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_zips() {
        let zips = ZipTable::sample();

        assert_eq!(zips.len(), 6);
        assert_eq!(zips.locate("36602"), Some(GeoPoint::new(30.6944, -88.0431)));
        assert_eq!(zips.locate(" 36602 "), Some(GeoPoint::new(30.6944, -88.0431)));
        assert_eq!(zips.locate("99999"), None);
    }

    #[test]
    fn test_sample_board() {
        let board = LoadBoard::sample();

        assert_eq!(board.len(), 3);
        assert_eq!(board.get("RL1002").map(|l| l.pickup_zip.as_str()), Some("36532"));
        assert!(board.get("RL9999").is_none());
    }

    #[test]
    fn test_from_toml() {
        let source = r#"
            [zips]
            "10001" = { latitude = 40.7506, longitude = -73.9972 }

            [[loads]]
            loadId = "NY1"
            pickupZip = "10001"
            pickupCity = "New York, NY"
            deliveryCity = "Boston, MA"
            broker = "Empire Freight"
            brokerEmail = "ops@example.com"
            brokerPhone = "555-111-2222"
            tripMiles = 215.0
        "#;

        let dataset = Dataset::from_toml_str(source).unwrap();

        assert_eq!(dataset.zips.len(), 1);
        assert_eq!(dataset.loads.len(), 1);
        assert_eq!(dataset.loads.loads()[0].trip_miles, 215.0);
    }

    #[test]
    fn test_duplicate_load_rejected() {
        let mut loads = LoadBoard::sample().loads().to_vec();
        loads.push(loads[0].clone());

        match LoadBoard::new(loads) {
            Err(DataError::DuplicateLoad(id)) => assert_eq!(id, "RL1001"),
            other => panic!("expected duplicate error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let result = Dataset::load("does/not/exist.toml");
        assert!(matches!(result, Err(DataError::Io(_))));
    }
}

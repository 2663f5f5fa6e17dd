use serde::{Deserialize, Serialize};

/// A point in decimal degrees, usually a ZIP centroid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// An available reload opportunity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadRecord {
    #[serde(rename = "loadId")]
    pub load_id: String,
    #[serde(rename = "pickupZip")]
    pub pickup_zip: String,
    #[serde(rename = "pickupCity")]
    pub pickup_city: String,
    #[serde(rename = "deliveryCity")]
    pub delivery_city: String,
    pub broker: String,
    #[serde(rename = "brokerEmail")]
    pub broker_email: String,
    #[serde(rename = "brokerPhone")]
    pub broker_phone: String,
    #[serde(rename = "tripMiles")]
    pub trip_miles: f64,
}

impl LoadRecord {
    /// `mailto:` link for contacting the broker about this load
    pub fn email_link(&self) -> String {
        format!(
            "mailto:{}?subject={}",
            self.broker_email,
            urlencoding::encode(&format!("Load {}", self.load_id))
        )
    }

    /// `tel:` link with everything but digits and a leading `+` stripped
    pub fn phone_link(&self) -> String {
        let digits: String = self
            .broker_phone
            .chars()
            .enumerate()
            .filter(|(i, c)| c.is_ascii_digit() || (*i == 0 && *c == '+'))
            .map(|(_, c)| c)
            .collect();
        format!("tel:{}", digits)
    }
}

/// A load within reach of the truck, with its deadhead distance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub load: LoadRecord,
    #[serde(rename = "deadheadMiles")]
    pub deadhead_miles: f64,
}

/// How a search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchStatus {
    /// At least one load was within the final radius
    Found,
    /// Nothing within the maximum radius
    Exhausted,
    /// The origin ZIP has no known centroid; no candidate was evaluated
    UnknownOrigin,
}

/// Result of one expanding-radius search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    #[serde(rename = "radiusMiles")]
    pub radius_miles: f64,
    pub matches: Vec<MatchResult>,
    #[serde(rename = "candidatesEvaluated")]
    pub candidates_evaluated: usize,
}

impl SearchOutcome {
    pub fn unknown_origin(radius_miles: f64) -> Self {
        Self {
            status: SearchStatus::UnknownOrigin,
            radius_miles,
            matches: Vec::new(),
            candidates_evaluated: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

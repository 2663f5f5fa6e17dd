use serde::{Deserialize, Serialize};
use crate::models::domain::{LoadRecord, MatchResult, SearchOutcome, SearchStatus};

/// A match as returned by the API, with broker contact links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadMatch {
    #[serde(flatten)]
    pub result: MatchResult,
    #[serde(rename = "emailLink")]
    pub email_link: String,
    #[serde(rename = "phoneLink")]
    pub phone_link: String,
}

impl From<MatchResult> for ReloadMatch {
    fn from(result: MatchResult) -> Self {
        let email_link = result.load.email_link();
        let phone_link = result.load.phone_link();
        Self {
            result,
            email_link,
            phone_link,
        }
    }
}

/// Response for the find reloads endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindReloadsResponse {
    #[serde(rename = "searchId")]
    pub search_id: uuid::Uuid,
    #[serde(rename = "truckId")]
    pub truck_id: Option<String>,
    #[serde(rename = "deliveryZip")]
    pub delivery_zip: String,
    #[serde(rename = "deliveryDate")]
    pub delivery_date: Option<chrono::NaiveDate>,
    pub status: SearchStatus,
    #[serde(rename = "radiusMiles")]
    pub radius_miles: f64,
    pub matches: Vec<ReloadMatch>,
    #[serde(rename = "candidatesEvaluated")]
    pub candidates_evaluated: usize,
    #[serde(rename = "searchedAt")]
    pub searched_at: chrono::DateTime<chrono::Utc>,
}

impl FindReloadsResponse {
    pub fn from_outcome(
        outcome: SearchOutcome,
        truck_id: Option<String>,
        delivery_zip: String,
        delivery_date: Option<chrono::NaiveDate>,
    ) -> Self {
        Self {
            search_id: uuid::Uuid::new_v4(),
            truck_id,
            delivery_zip,
            delivery_date,
            status: outcome.status,
            radius_miles: outcome.radius_miles,
            matches: outcome.matches.into_iter().map(ReloadMatch::from).collect(),
            candidates_evaluated: outcome.candidates_evaluated,
            searched_at: chrono::Utc::now(),
        }
    }
}

/// Response listing the loads currently on the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadsResponse {
    pub loads: Vec<LoadRecord>,
    pub total: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub loads: usize,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

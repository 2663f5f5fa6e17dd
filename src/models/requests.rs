use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to find reloads near a truck's delivery ZIP
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindReloadsRequest {
    #[validate(length(max = 64))]
    #[serde(alias = "truck_id", rename = "truckId", default)]
    pub truck_id: Option<String>,
    #[validate(length(min = 1, max = 10))]
    #[serde(alias = "delivery_zip", rename = "deliveryZip")]
    pub delivery_zip: String,
    #[serde(alias = "delivery_date", rename = "deliveryDate", default)]
    pub delivery_date: Option<chrono::NaiveDate>,
    #[validate(range(min = 0.1, max = 5000.0))]
    #[serde(alias = "start_radius_miles", rename = "startRadiusMiles", default)]
    pub start_radius_miles: Option<f64>,
    #[validate(range(min = 0.1, max = 5000.0))]
    #[serde(alias = "radius_step_miles", rename = "radiusStepMiles", default)]
    pub radius_step_miles: Option<f64>,
    #[validate(range(min = 0.1, max = 5000.0))]
    #[serde(alias = "max_radius_miles", rename = "maxRadiusMiles", default)]
    pub max_radius_miles: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_request() {
        let req: FindReloadsRequest =
            serde_json::from_str(r#"{"deliveryZip": "36602"}"#).unwrap();

        assert_eq!(req.delivery_zip, "36602");
        assert!(req.truck_id.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_snake_case_aliases() {
        let req: FindReloadsRequest = serde_json::from_str(
            r#"{"truck_id": "T-42", "delivery_zip": "36532", "delivery_date": "2024-05-01", "max_radius_miles": 500}"#,
        )
        .unwrap();

        assert_eq!(req.truck_id.as_deref(), Some("T-42"));
        assert_eq!(req.delivery_date, chrono::NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(req.max_radius_miles, Some(500.0));
    }

    #[test]
    fn test_empty_zip_rejected() {
        let req: FindReloadsRequest = serde_json::from_str(r#"{"deliveryZip": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_zero_step_rejected() {
        let req: FindReloadsRequest =
            serde_json::from_str(r#"{"deliveryZip": "36602", "radiusStepMiles": 0}"#).unwrap();
        assert!(req.validate().is_err());
    }
}

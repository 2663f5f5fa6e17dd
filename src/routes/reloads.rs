use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{find_reload_matches, LoadSource, Matcher};
use crate::models::{FindReloadsRequest, FindReloadsResponse, HealthResponse, LoadsResponse, ErrorResponse};
use crate::services::{LoadBoard, ZipResolver};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub loads: Arc<LoadBoard>,
    pub resolver: ZipResolver,
    pub matcher: Matcher,
}

/// Configure all reload routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/loads", web::get().to(list_loads))
        .route("/reloads/find", web::post().to(find_reloads));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.loads.is_empty() { "degraded" } else { "healthy" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        loads: state.loads.len(),
    })
}

/// List every load on the board
///
/// GET /api/v1/loads
async fn list_loads(state: web::Data<AppState>) -> impl Responder {
    let loads = state.loads.loads().to_vec();

    HttpResponse::Ok().json(LoadsResponse {
        total: loads.len(),
        loads,
    })
}

/// Find reloads endpoint
///
/// POST /api/v1/reloads/find
///
/// Request body:
/// ```json
/// {
///   "truckId": "string",
///   "deliveryZip": "36602",
///   "deliveryDate": "2024-05-01",
///   "startRadiusMiles": 100,
///   "radiusStepMiles": 50,
///   "maxRadiusMiles": 300
/// }
/// ```
async fn find_reloads(
    state: web::Data<AppState>,
    req: web::Json<FindReloadsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_reloads request: field_errors={:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let radius = match state.matcher.radius().with_overrides(
        req.start_radius_miles,
        req.radius_step_miles,
        req.max_radius_miles,
    ) {
        Ok(radius) => radius,
        Err(e) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid search radius".to_string(),
                message: e.to_string(),
                status_code: 400,
            });
        }
    };

    let FindReloadsRequest {
        truck_id,
        delivery_zip,
        delivery_date,
        ..
    } = req.into_inner();

    tracing::info!(
        "Finding reloads for truck {:?} delivering to {} (radius {}..{} step {})",
        truck_id,
        delivery_zip,
        radius.start(),
        radius.max(),
        radius.step()
    );

    let candidates = state.loads.loads();

    // Geocode everything up front; this is the only await in the search
    let pickups = candidates.iter().map(|load| load.pickup_zip.as_str());
    let geocoder = match state.resolver.resolve_all(&delivery_zip, pickups).await {
        Ok(table) => table,
        Err(e) => {
            tracing::error!("Geocoding failed for {}: {}", delivery_zip, e);
            return HttpResponse::BadGateway().json(ErrorResponse {
                error: "Geocoding failed".to_string(),
                message: e.to_string(),
                status_code: 502,
            });
        }
    };

    let outcome = find_reload_matches(&delivery_zip, candidates, &geocoder, &radius);

    tracing::info!(
        "Returning {} reloads for {} at {} mi ({:?}, {} candidates)",
        outcome.matches.len(),
        delivery_zip,
        outcome.radius_miles,
        outcome.status,
        outcome.candidates_evaluated
    );

    HttpResponse::Ok().json(FindReloadsResponse::from_outcome(
        outcome,
        truck_id,
        delivery_zip,
        delivery_date,
    ))
}

impl AppState {
    /// State over the built-in sample data with default search settings
    pub fn sample() -> Self {
        Self {
            loads: Arc::new(LoadBoard::sample()),
            resolver: ZipResolver::new(Arc::new(crate::services::ZipTable::sample()), None),
            matcher: Matcher::default(),
        }
    }
}

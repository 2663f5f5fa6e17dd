use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use reload_match::config::Settings;
use reload_match::core::Matcher;
use reload_match::routes::{self, reloads::AppState};
use reload_match::services::{Dataset, RemoteGeocoder, ZipResolver};
use std::sync::Arc;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn io_error<E: std::fmt::Display>(context: &str, e: E) -> std::io::Error {
    error!("{}: {}", context, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
    })?;

    // LOG_LEVEL / RUST_LOG win over the config file
    let filter = std::env::var("LOG_LEVEL")
        .ok()
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting reload matching service...");

    let radius = settings
        .search
        .radius()
        .map_err(|e| io_error("Invalid search settings", e))?;
    let matcher = Matcher::new(radius);

    info!("Matcher initialized with radius schedule: {:?}", radius);

    let dataset = match &settings.data.dataset_path {
        Some(path) => Dataset::load(path).map_err(|e| io_error("Failed to load dataset", e))?,
        None => {
            info!("No dataset configured, serving the built-in sample loads");
            Dataset::sample()
        }
    };

    let remote = match &settings.geocoder.remote_url {
        Some(url) => {
            let geocoder = RemoteGeocoder::new(
                url.clone(),
                settings.geocoder.timeout(),
                settings.geocoder.cache_size,
                settings.geocoder.cache_ttl(),
            )
            .map_err(|e| io_error("Failed to build geocoder client", e))?;
            info!(
                "Remote geocoder at {} (timeout: {}s, deadline: {}ms, cache: {} entries)",
                url,
                settings.geocoder.timeout_secs,
                settings.geocoder.deadline_ms,
                settings.geocoder.cache_size
            );
            Some(Arc::new(geocoder))
        }
        None => None,
    };

    let app_state = AppState {
        loads: Arc::new(dataset.loads),
        resolver: ZipResolver::new(Arc::new(dataset.zips), remote)
            .with_deadline(settings.geocoder.deadline()),
        matcher,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}

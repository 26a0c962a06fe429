use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cafe_radar::config::{Settings, SourceKind};
use cafe_radar::routes::{self, shops::AppState};
use cafe_radar::services::{AppwriteSource, InMemorySource, RateLimitStore, ShopSource};
use cafe_radar::Ranker;

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

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn build_source(settings: &Settings) -> std::io::Result<ShopSource> {
    match settings.source.kind {
        SourceKind::Memory => {
            let source = match &settings.source.seed_path {
                Some(path) => InMemorySource::from_json_file(path)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?,
                None => {
                    info!("No seed file configured, starting with an empty catalogue");
                    InMemorySource::default()
                }
            };
            Ok(ShopSource::Memory(source))
        }
        SourceKind::Appwrite => {
            let appwrite = settings.appwrite.clone().ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "source.kind = appwrite requires an [appwrite] section",
                )
            })?;

            let source = AppwriteSource::new(
                appwrite.endpoint,
                appwrite.api_key,
                appwrite.project_id,
                appwrite.database_id,
                appwrite.shops_collection,
                appwrite.page_limit.unwrap_or(500),
                Duration::from_secs(appwrite.timeout_secs.unwrap_or(10)),
            )
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

            Ok(ShopSource::Appwrite(source))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting Cafe Radar ranking service...");

    let weights = settings.scoring_weights().map_err(|e| {
        error!("Invalid scoring configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let ranker = Ranker::new(weights).with_parallel_threshold(settings.ranking.parallel_threshold);

    info!("Ranker initialized with weights: {:?}", weights);

    let source = Arc::new(build_source(&settings)?);

    info!("Candidate source initialized ({})", source.kind());

    let rate_limiter = Arc::new(RateLimitStore::new(
        settings.rate_limit.max_requests,
        chrono::Duration::seconds(settings.rate_limit.window_secs),
    ));

    // Build application state
    let app_state = AppState {
        ranker,
        source,
        rate_limiter,
        ranking: settings.ranking.clone(),
        sweep_threshold: settings.rate_limit.sweep_threshold,
    };

    // Configure HTTP server
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

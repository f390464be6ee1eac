#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web analytics API for the `CityPulse` dashboard.
//!
//! Serves live readings (traffic, air, water, electricity, complaints),
//! the electricity demand forecast, per-zone metrics, operational alerts
//! and feedback sentiment analytics. Readings and alerts are persisted in
//! a `SQLite` store at `data/citypulse.db`; background tasks keep the
//! readings fresh and raise alerts when thresholds are crossed.

mod handlers;
pub mod zones;

use std::path::Path;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use citypulse_monitor::{Monitor, MonitorConfig, scheduler};
use switchy_database::Database;

/// Shared application state.
pub struct AppState {
    /// Readings and alerts store.
    pub db: Arc<dyn Database>,
    /// Collectors, sharing the same store.
    pub monitor: Arc<Monitor>,
}

impl AppState {
    /// Builds the state around `db`, with collectors configured by
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns [`citypulse_monitor::MonitorError`] if the HTTP client
    /// cannot be built.
    pub fn new(
        db: Arc<dyn Database>,
        config: MonitorConfig,
    ) -> Result<Self, citypulse_monitor::MonitorError> {
        let monitor = Monitor::new(config, Arc::clone(&db))?;
        Ok(Self {
            db,
            monitor: Arc::new(monitor),
        })
    }
}

/// Registers every route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/traffic", web::get().to(handlers::traffic))
        .route("/air", web::get().to(handlers::air))
        .route("/water", web::get().to(handlers::water))
        .route("/electricity", web::get().to(handlers::electricity))
        .route(
            "/electricity/forecast",
            web::get().to(handlers::electricity_forecast),
        )
        .route("/complaints", web::get().to(handlers::complaints))
        .route("/zones", web::get().to(handlers::zones))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .route("/alerts", web::get().to(handlers::alerts))
                .route(
                    "/alerts/{id}/resolve",
                    web::post().to(handlers::resolve_alert),
                )
                .route(
                    "/sentiment/summary",
                    web::get().to(handlers::sentiment_summary),
                )
                .route("/sentiment/trend", web::get().to(handlers::sentiment_trend))
                .route(
                    "/sentiment/wordcloud",
                    web::get().to(handlers::sentiment_wordcloud),
                )
                .route(
                    "/sentiment/topics",
                    web::get().to(handlers::sentiment_topics),
                )
                .route(
                    "/sentiment/complaints",
                    web::get().to(handlers::sentiment_complaints),
                ),
        );
}

/// Starts the `CityPulse` API server.
///
/// Opens (and seeds) the store, starts the background collectors and
/// runs the Actix-Web HTTP server. The caller provides the async runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the store cannot be opened, the
/// HTTP client cannot be built, or the server fails to bind or run.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let db_path = citypulse_database::database_path(|key| std::env::var(key).ok());
    log::info!("Opening store at {db_path}...");
    let db = citypulse_database::open_db(Path::new(&db_path))
        .await
        .map_err(std::io::Error::other)?;

    let config = MonitorConfig::from_env();
    log::info!("Reading feedback from {}", config.feedback_path.display());
    let state = AppState::new(Arc::from(db), config).map_err(std::io::Error::other)?;

    log::info!("Starting background collectors...");
    let jobs = scheduler::spawn(Arc::clone(&state.monitor));
    log::debug!("Spawned {} collector task(s)", jobs.len());

    let state = web::Data::new(state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    let result = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await;

    for job in jobs {
        job.abort();
    }

    result
}

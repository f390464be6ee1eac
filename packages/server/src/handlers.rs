//! HTTP handler functions for the `CityPulse` API.

use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDateTime};
use citypulse_database::{alerts, readings};
use citypulse_feedback::FeedbackSet;
use citypulse_monitor::MonitorError;
use citypulse_monitor::air::DEFAULT_AIR_POINT;
use citypulse_server_models::{AirQueryParams, ApiError, ApiHealth, DaysQueryParams};
use futures::future::join_all;

use crate::{AppState, zones};

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Maps a collector failure to `502 Bad Gateway`.
fn collector_failed(what: &str, e: &MonitorError) -> HttpResponse {
    log::error!("{what} fetch failed: {e}");
    HttpResponse::BadGateway().json(ApiError::new(format!("{what} fetch failed")))
}

/// `GET /traffic`
pub async fn traffic(state: web::Data<AppState>) -> HttpResponse {
    match state.monitor.traffic().await {
        Ok(reading) => HttpResponse::Ok().json(reading),
        Err(e) => collector_failed("Traffic", &e),
    }
}

/// `GET /air?lat=..&lon=..`
///
/// Missing coordinates fall back to the city centre.
pub async fn air(state: web::Data<AppState>, params: web::Query<AirQueryParams>) -> HttpResponse {
    let lat = params.lat.unwrap_or(DEFAULT_AIR_POINT.0);
    let lon = params.lon.unwrap_or(DEFAULT_AIR_POINT.1);

    match state.monitor.air(lat, lon).await {
        Ok(reading) => HttpResponse::Ok().json(reading),
        Err(e) => collector_failed("Air quality", &e),
    }
}

/// `GET /water`
pub async fn water(state: web::Data<AppState>) -> HttpResponse {
    match state.monitor.water().await {
        Ok(reading) => HttpResponse::Ok().json(reading),
        Err(e) => collector_failed("Water", &e),
    }
}

/// `GET /electricity`
pub async fn electricity(state: web::Data<AppState>) -> HttpResponse {
    match state.monitor.electricity().await {
        Ok(reading) => HttpResponse::Ok().json(reading),
        Err(e) => collector_failed("Electricity", &e),
    }
}

/// `GET /complaints`
pub async fn complaints(state: web::Data<AppState>) -> HttpResponse {
    match state.monitor.complaints().await {
        Ok(reading) => HttpResponse::Ok().json(reading),
        Err(e) => collector_failed("Complaints", &e),
    }
}

/// `GET /electricity/forecast`
///
/// Fits the demand model on a freshly simulated history.
pub async fn electricity_forecast() -> HttpResponse {
    let now = Local::now().naive_local();
    match citypulse_forecast::synthetic_forecast(&mut rand::thread_rng(), now) {
        Ok(forecast) => HttpResponse::Ok().json(forecast),
        Err(e) => {
            log::error!("Failed to build forecast: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to build forecast"))
        }
    }
}

/// `GET /zones`
///
/// Fetches air quality at every zone's coordinates concurrently. A zone
/// whose fetch fails falls back to the latest stored reading.
pub async fn zones(state: web::Data<AppState>) -> HttpResponse {
    let zone_list = match citypulse_database::zones::list_zones(state.db.as_ref()).await {
        Ok(list) => list,
        Err(e) => {
            log::error!("Failed to list zones: {e}");
            return HttpResponse::InternalServerError()
                .json(ApiError::new("Failed to list zones"));
        }
    };

    let cached = match readings::latest_air(state.db.as_ref()).await {
        Ok(sample) => sample.and_then(|s| s.aqi),
        Err(e) => {
            log::warn!("No cached air reading for zones: {e}");
            None
        }
    };

    let fetched = join_all(
        zone_list
            .iter()
            .map(|zone| state.monitor.air(zone.latitude, zone.longitude)),
    )
    .await;

    let mut rng = rand::thread_rng();
    let views: Vec<_> = zone_list
        .iter()
        .zip(fetched)
        .map(|(zone, reading)| {
            let aqi = match reading {
                Ok(reading) => reading.aqi.or(cached),
                Err(e) => {
                    log::warn!("Air fetch for zone {} failed: {e}", zone.name);
                    cached
                }
            };
            zones::zone_view(&mut rng, zone, aqi)
        })
        .collect();

    HttpResponse::Ok().json(views)
}

/// `GET /api/alerts`
///
/// Newest first.
pub async fn alerts(state: web::Data<AppState>) -> HttpResponse {
    match alerts::list_alerts(state.db.as_ref()).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => {
            log::error!("Failed to list alerts: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to list alerts"))
        }
    }
}

/// `POST /api/alerts/{id}/resolve`
pub async fn resolve_alert(state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    let id = path.into_inner();
    match alerts::resolve_alert(state.db.as_ref(), id).await {
        Ok(Some(alert)) => {
            log::info!("Resolved alert {id} ({})", alert.title);
            HttpResponse::Ok().json(alert)
        }
        Ok(None) => HttpResponse::NotFound().json(ApiError::new("Alert not found")),
        Err(e) => {
            log::error!("Failed to resolve alert {id}: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to resolve alert"))
        }
    }
}

/// Loads the feedback window for a sentiment request. Feedback
/// timestamps are local time.
fn feedback_window(state: &AppState, params: DaysQueryParams) -> Result<FeedbackSet, HttpResponse> {
    let now: NaiveDateTime = Local::now().naive_local();
    let path = &state.monitor.config().feedback_path;

    citypulse_feedback::load(path, now)
        .map(|set| set.since_days(now, params.days()))
        .map_err(|e| {
            log::error!("Failed to load feedback from {}: {e}", path.display());
            HttpResponse::InternalServerError().json(ApiError::new("Failed to load feedback"))
        })
}

/// `GET /api/sentiment/summary?days=N`
pub async fn sentiment_summary(
    state: web::Data<AppState>,
    params: web::Query<DaysQueryParams>,
) -> HttpResponse {
    match feedback_window(&state, params.into_inner()) {
        Ok(set) => HttpResponse::Ok().json(set.summary()),
        Err(response) => response,
    }
}

/// `GET /api/sentiment/trend?days=N`
pub async fn sentiment_trend(
    state: web::Data<AppState>,
    params: web::Query<DaysQueryParams>,
) -> HttpResponse {
    match feedback_window(&state, params.into_inner()) {
        Ok(set) => HttpResponse::Ok().json(set.trend()),
        Err(response) => response,
    }
}

/// `GET /api/sentiment/wordcloud?days=N`
pub async fn sentiment_wordcloud(
    state: web::Data<AppState>,
    params: web::Query<DaysQueryParams>,
) -> HttpResponse {
    match feedback_window(&state, params.into_inner()) {
        Ok(set) => HttpResponse::Ok().json(set.word_cloud()),
        Err(response) => response,
    }
}

/// `GET /api/sentiment/topics?days=N`
pub async fn sentiment_topics(
    state: web::Data<AppState>,
    params: web::Query<DaysQueryParams>,
) -> HttpResponse {
    match feedback_window(&state, params.into_inner()) {
        Ok(set) => HttpResponse::Ok().json(set.topics()),
        Err(response) => response,
    }
}

/// `GET /api/sentiment/complaints?days=N`
///
/// A random sample of feedback in the window.
pub async fn sentiment_complaints(
    state: web::Data<AppState>,
    params: web::Query<DaysQueryParams>,
) -> HttpResponse {
    match feedback_window(&state, params.into_inner()) {
        Ok(set) => HttpResponse::Ok().json(set.sample_complaints(&mut rand::thread_rng())),
        Err(response) => response,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use actix_web::{App, HttpResponse, HttpServer, http::StatusCode, test, web};
    use chrono::{Duration, Local, NaiveDateTime};
    use citypulse_city_models::{AlertSeverity, AlertStatus};
    use citypulse_database::readings::{self, AirSample};
    use citypulse_feedback::FeedbackRecord;
    use citypulse_monitor::MonitorConfig;
    use citypulse_server_models::{
        AirQueryParams, ApiAlert, ApiSampleComplaint, ApiTopic, ApiZone, ForecastResponse,
        SentimentSummaryResponse, WaterReading,
    };

    use crate::{AppState, configure};

    async fn state(name: &str) -> (web::Data<AppState>, PathBuf) {
        state_with(name, |_| {}).await
    }

    async fn state_with(
        name: &str,
        adjust: impl FnOnce(&mut MonitorConfig),
    ) -> (web::Data<AppState>, PathBuf) {
        let dir = std::env::temp_dir().join(format!("citypulse_server_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        let db = citypulse_database::open_db(&dir.join("citypulse.db"))
            .await
            .unwrap();
        let mut config = MonitorConfig {
            feedback_path: dir.join("feedback.csv"),
            ..MonitorConfig::default()
        };
        adjust(&mut config);
        let state = AppState::new(Arc::from(db), config).unwrap();
        (web::Data::new(state), dir)
    }

    /// Stand-in air pollution service: AQI 5 south of latitude 28.6,
    /// AQI 2 elsewhere.
    async fn air_pollution_by_latitude(params: web::Query<AirQueryParams>) -> HttpResponse {
        let aqi = if params.lat.unwrap_or_default() < 28.6 { 5 } else { 2 };
        HttpResponse::Ok().json(serde_json::json!({ "list": [{ "main": { "aqi": aqi } }] }))
    }

    fn write_feedback(dir: &std::path::Path, rows: &[(&str, NaiveDateTime)]) {
        let records: Vec<FeedbackRecord> = rows
            .iter()
            .zip(1..)
            .map(|((text, at), id)| FeedbackRecord {
                id,
                text: (*text).to_string(),
                timestamp: Some(at.format(citypulse_feedback::TIMESTAMP_FORMAT).to_string()),
            })
            .collect();
        citypulse_feedback::write_records(&dir.join("feedback.csv"), &records).unwrap();
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let (state, dir) = state("health").await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[actix_web::test]
    async fn alerts_are_seeded_and_resolvable() {
        let (state, dir) = state("alerts").await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/alerts").to_request();
        let list: Vec<ApiAlert> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(list.len(), 8);
        let open = list.iter().find(|a| a.status.is_open()).unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/api/alerts/{}/resolve", open.id))
            .to_request();
        let resolved: ApiAlert = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resolved.id, open.id);
        assert_eq!(resolved.status, AlertStatus::Resolved);
        assert_eq!(resolved.severity, AlertSeverity::Resolved);
        assert_eq!(resolved.estimated_resolution, "Completed");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[actix_web::test]
    async fn resolving_unknown_alert_is_not_found() {
        let (state, dir) = state("alerts_missing").await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/alerts/9999/resolve")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Alert not found");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[actix_web::test]
    async fn zones_without_air_readings_report_zero() {
        let (state, dir) = state("zones").await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get().uri("/zones").to_request();
        let zones: Vec<ApiZone> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(zones.len(), 5);
        for zone in &zones {
            assert_eq!(zone.aqi, 0);
            assert!(!zone.recommendations.is_empty());
            assert!((60..=120).contains(&zone.water_usage));
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[actix_web::test]
    async fn failed_zone_fetch_uses_stored_reading() {
        let (state, dir) = state("zones_cached").await;
        readings::record_air(
            state.db.as_ref(),
            &AirSample {
                timestamp: citypulse_database::now(),
                aqi: Some(3),
                description: "Moderate".to_string(),
            },
        )
        .await
        .unwrap();
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get().uri("/zones").to_request();
        let zones: Vec<ApiZone> = test::call_and_read_body_json(&app, req).await;
        assert!(zones.iter().all(|z| z.aqi == 3));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[actix_web::test]
    async fn each_zone_gets_its_own_air_quality() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let upstream = HttpServer::new(|| {
            App::new().route("/air_pollution", web::get().to(air_pollution_by_latitude))
        })
        .workers(1)
        .listen(listener)
        .unwrap()
        .run();
        let upstream_handle = upstream.handle();
        actix_web::rt::spawn(upstream);

        let (state, dir) = state_with("zones_per_zone_air", |config| {
            config.owm_key = Some("test-key".to_string());
            config.air_url = format!("http://{addr}/air_pollution");
        })
        .await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get().uri("/zones").to_request();
        let zones: Vec<ApiZone> = test::call_and_read_body_json(&app, req).await;
        let aqi_of = |name: &str| zones.iter().find(|z| z.name == name).unwrap().aqi;
        assert_eq!(aqi_of("Industrial Hub"), 5);
        assert_eq!(aqi_of("Residential South"), 5);
        assert_eq!(aqi_of("Eco Park Zone"), 2);
        assert_eq!(aqi_of("University Campus"), 2);

        let purifiers = "Deploy air purifiers and monitor emissions.".to_string();
        for zone in &zones {
            assert_eq!(zone.recommendations.contains(&purifiers), zone.aqi >= 4);
        }

        upstream_handle.stop(true).await;
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[actix_web::test]
    async fn water_reading_is_simulated() {
        let (state, dir) = state("water").await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get().uri("/water").to_request();
        let reading: WaterReading = test::call_and_read_body_json(&app, req).await;
        assert!(reading.water_usage.ends_with(" ML"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[actix_web::test]
    async fn missing_provider_key_is_bad_gateway() {
        let (state, dir) = state("traffic").await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get().uri("/traffic").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Traffic fetch failed");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[actix_web::test]
    async fn forecast_has_two_days_of_steps() {
        let (state, dir) = state("forecast").await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/electricity/forecast")
            .to_request();
        let forecast: ForecastResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(forecast.forecast.len(), citypulse_forecast::DEFAULT_HORIZON);
        assert_eq!(forecast.stats.method, "Holt-Winters");
        assert_eq!(forecast.feature_importance.len(), 6);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[actix_web::test]
    async fn sentiment_respects_day_window() {
        let (state, dir) = state("sentiment").await;
        let now = Local::now().naive_local();
        write_feedback(
            &dir,
            &[
                ("The new park is excellent", now - Duration::hours(2)),
                ("Garbage is not collected, terrible", now - Duration::hours(3)),
                ("Water supply was fine today", now - Duration::days(10)),
            ],
        );
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/sentiment/summary?days=7")
            .to_request();
        let summary: SentimentSummaryResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary.total, 2);
        assert_eq!((summary.positive, summary.negative, summary.neutral), (50, 50, 0));

        let req = test::TestRequest::get()
            .uri("/api/sentiment/topics")
            .to_request();
        let topics: Vec<ApiTopic> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(topics.len(), 3);
        assert!(topics.iter().all(|t| t.percentage == 33));

        let req = test::TestRequest::get()
            .uri("/api/sentiment/complaints")
            .to_request();
        let sample: Vec<ApiSampleComplaint> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(sample.len(), 3);
        assert!(sample.iter().all(|c| (85..=98).contains(&c.confidence)));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[actix_web::test]
    async fn missing_feedback_file_is_empty_not_error() {
        let (state, dir) = state("sentiment_empty").await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/sentiment/wordcloud")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let _ = std::fs::remove_dir_all(&dir);
    }
}

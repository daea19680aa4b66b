//! HTTP route handlers.

use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event as SseEvent, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::Stream;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::controller::{ControllerError, Event};
use crate::search::SearchError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/isochrone", post(isochrone))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Cache and run statistics.
async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let controller = &state.controller;
    Json(StatsResponse {
        latest_run: controller.latest_run(),
        locations: controller.locations_loaded(),
        cache: controller.cache().stats(),
    })
}

/// Start a run and stream its events.
///
/// The stream ends when the run completes or is superseded by a newer
/// request. Dropping the connection stops the run at its next event.
async fn isochrone(
    State(state): State<AppState>,
    body: Result<Json<IsochroneRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, AppError> {
    let Json(req) = body.map_err(|e| AppError::BadRequest {
        message: e.body_text(),
    })?;
    let request = req.into_search_request()?;
    let rx = state.controller.submit(request)?;

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        Some((Ok::<_, Infallible>(to_sse(&event)), rx))
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn to_sse(event: &Event) -> SseEvent {
    SseEvent::default()
        .event(event.name())
        .json_data(event)
        .unwrap_or_else(|e| {
            warn!(error = %e, "failed to encode event");
            SseEvent::default()
                .event("error")
                .data(format!("failed to encode event: {e}"))
        })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Conflict { message: String },
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<ControllerError> for AppError {
    fn from(e: ControllerError) -> Self {
        match e {
            ControllerError::Invalid(e) => e.into(),
            ControllerError::StaleRun { .. } => AppError::Conflict {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::controller::RunController;
    use crate::data::DataBackend;
    use crate::domain::RunId;
    use crate::fixtures::Network;
    use crate::search::SearchConfig;

    async fn serve(net: &Network) -> String {
        let controller = RunController::new(
            DataBackend::Mock(net.mock()),
            &CacheConfig::default(),
            SearchConfig::default(),
        );
        let app = create_router(AppState::new(controller));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn body(run_id: u64, thresholds: &[f64]) -> serde_json::Value {
        serde_json::json!({
            "run_id": run_id,
            "lat": 37.77,
            "lon": -122.42,
            "thresholds": thresholds,
            "routes": ["14"],
            "date": "2019-12-04",
        })
    }

    #[test]
    fn error_status_codes() {
        let bad = AppError::from(SearchError::InvalidRequest("x".into())).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let stale = AppError::from(ControllerError::StaleRun {
            run_id: RunId(1),
            latest: RunId(2),
        })
        .into_response();
        assert_eq!(stale.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn health_and_stats() {
        let base = serve(&Network::scenario()).await;
        let client = reqwest::Client::new();

        let health = client.get(format!("{base}/health")).send().await.unwrap();
        assert_eq!(health.text().await.unwrap(), "ok");

        let stats: serde_json::Value = client
            .get(format!("{base}/stats"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(stats["latest_run"], 0);
        assert!(stats["locations"].is_null());
    }

    #[tokio::test]
    async fn streams_run_events() {
        let base = serve(&Network::scenario()).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/isochrone"))
            .json(&body(1, &[5.0, 10.0, 20.0]))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let text = response.text().await.unwrap();
        assert!(text.contains("event: accepted"));
        assert_eq!(text.matches("event: snapshot").count(), 3);
        assert!(text.contains(r#""type":"snapshot""#));
    }

    #[tokio::test]
    async fn rejects_bad_and_stale_requests() {
        let base = serve(&Network::scenario()).await;
        let client = reqwest::Client::new();

        let malformed = client
            .post(format!("{base}/isochrone"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(malformed.status(), reqwest::StatusCode::BAD_REQUEST);

        let unsorted = client
            .post(format!("{base}/isochrone"))
            .json(&body(1, &[10.0, 5.0]))
            .send()
            .await
            .unwrap();
        assert_eq!(unsorted.status(), reqwest::StatusCode::BAD_REQUEST);
        let err: serde_json::Value = unsorted.json().await.unwrap();
        assert!(err["error"].as_str().unwrap().contains("ascending"));

        let first = client
            .post(format!("{base}/isochrone"))
            .json(&body(2, &[5.0]))
            .send()
            .await
            .unwrap();
        assert_eq!(first.status(), reqwest::StatusCode::OK);
        let _ = first.text().await.unwrap();

        let stale = client
            .post(format!("{base}/isochrone"))
            .json(&body(2, &[5.0]))
            .send()
            .await
            .unwrap();
        assert_eq!(stale.status(), reqwest::StatusCode::CONFLICT);
    }
}

use axum::extract::State;
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{data, success};

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct Endpoints {
    health: &'static str,
    events: &'static str,
}

#[derive(Serialize)]
struct WelcomePayload {
    name: &'static str,
    version: &'static str,
    endpoints: Endpoints,
}

pub async fn root() -> Response {
    let payload = WelcomePayload {
        name: "Event Finder API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            health: "/api/health",
            events: "/api/events",
        },
    };

    data(payload)
}

pub async fn health_check(State(state): State<AppState>) -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "event-finder-api",
        timestamp: state.store.now(),
    };

    success(payload, "API is running")
}

pub async fn not_found(method: Method, uri: Uri) -> Response {
    AppError::NotFound(format!("Route {} {} not found", method, uri.path())).into_response()
}

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, Config};
use crate::handlers::{
    create_event, get_event, health_check, join_event, leave_event, list_events, not_found, root,
};
use crate::middleware::{handle_panic, log_requests};
use crate::state::AppState;

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let events = Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/:id", get(get_event))
        .route("/:id/join", post(join_event))
        .route("/:id/leave", post(leave_event));

    // Nesting only matches `/api/events`, so the trailing-slash form is routed explicitly.
    let api = Router::new()
        .route("/health", get(health_check))
        .route("/events/", get(list_events).post(create_event))
        .nest("/events", events);

    Router::new()
        .route("/", get(root))
        .nest("/api", api)
        .fallback(not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(config))
                .layer(middleware::from_fn(log_requests))
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
}

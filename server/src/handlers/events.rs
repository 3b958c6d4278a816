use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::models::{CreateEventRequest, ListEventsQuery};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, data, list, success};
use crate::validation::{validate_create, validate_query};

/// POST /api/events
pub async fn create_event(
    State(state): State<AppState>,
    body: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = body?;
    let new_event =
        validate_create(request, state.store.now()).map_err(AppError::ValidationError)?;

    let event = state.store.create(new_event)?;
    tracing::info!(event_id = %event.id, title = %event.title, "Event created");

    Ok(created(event, "Event created successfully"))
}

/// GET /api/events
pub async fn list_events(
    State(state): State<AppState>,
    query: Result<Query<ListEventsQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let filters = validate_query(query).map_err(AppError::ValidationError)?;

    Ok(list(state.store.list(&filters)))
}

/// GET /api/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let event = state.store.get(parse_id(&id)?)?;
    Ok(data(event))
}

/// POST /api/events/:id/join
pub async fn join_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let event = state.store.join(parse_id(&id)?)?;
    tracing::info!(
        event_id = %event.id,
        participants = event.current_participants,
        "Participant joined"
    );
    Ok(success(event, "Successfully joined the event"))
}

/// POST /api/events/:id/leave
pub async fn leave_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let event = state.store.leave(parse_id(&id)?)?;
    tracing::info!(
        event_id = %event.id,
        participants = event.current_participants,
        "Participant left"
    );
    Ok(success(event, "Successfully left the event"))
}

// A malformed id cannot name any stored event.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Event not found".to_string()))
}

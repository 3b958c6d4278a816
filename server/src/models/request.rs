use serde::Deserialize;
use serde_json::Value;

/// Body of `POST /api/events` before validation.
///
/// Numeric fields stay raw so a wrongly typed value becomes a field error
/// instead of failing the whole body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    pub date: Option<String>,
    pub max_participants: Option<Value>,
    pub current_participants: Option<Value>,
}

/// Query string of `GET /api/events` before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsQuery {
    pub location: Option<String>,
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

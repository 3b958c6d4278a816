use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use event_finder_server::config::Config;
use event_finder_server::routes::create_routes;
use event_finder_server::{AppState, EventStore, FixedClock};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
}

fn test_app() -> (Router, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(start()));
    let state = AppState::new(EventStore::new(clock.clone()));
    (create_routes(state, &Config::default()), clock)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn event_body(title: &str, location: &str, date: &str, max: u32) -> Value {
    json!({
        "title": title,
        "description": format!("{title} for everyone who likes it"),
        "location": location,
        "date": date,
        "maxParticipants": max,
    })
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, value) = send(app, Method::POST, "/api/events", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{value}");
    value["data"].clone()
}

fn titles(value: &Value) -> Vec<String> {
    value["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_root_and_health() {
    let (app, _) = test_app();

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["endpoints"]["events"], "/api/events");

    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "API is running");
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["timestamp"], "2025-05-01T12:00:00Z");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _) = test_app();

    let (status, body) = send(&app, Method::GET, "/api/nothing-here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_create_and_get_event() {
    let (app, _) = test_app();

    let created = create(
        &app,
        event_body("Sunset Yoga", "Central Park", "2025-06-10T18:00:00Z", 10),
    )
    .await;
    assert_eq!(created["currentParticipants"], 0);
    assert_eq!(created["maxParticipants"], 10);
    assert_eq!(created["createdAt"], created["updatedAt"]);

    let id = created["id"].as_str().unwrap();
    let (status, body) = send(&app, Method::GET, &format!("/api/events/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], created);
}

#[tokio::test]
async fn test_create_reports_validation_errors() {
    let (app, _) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(json!({ "title": "Yo", "maxParticipants": 0 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(
        fields,
        vec!["title", "description", "location", "date", "maxParticipants"]
    );
}

#[tokio::test]
async fn test_create_reports_wrongly_typed_numbers_as_field_errors() {
    let (app, _) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(json!({ "title": "Yo", "latitude": "north" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let details = body["error"]["details"].as_array().unwrap();
    assert!(details
        .iter()
        .any(|e| e["field"] == "latitude" && e["message"] == "Latitude must be between -90 and 90"));
    assert!(details.iter().any(|e| e["field"] == "title"));
}

#[tokio::test]
async fn test_create_accepts_whole_float_capacity() {
    let (app, _) = test_app();

    let mut body = event_body("Float Fest", "Harbor", "2025-06-10T18:00:00Z", 1);
    body["maxParticipants"] = json!(20.0);
    let created = create(&app, body).await;
    assert_eq!(created["maxParticipants"], 20);
}

#[tokio::test]
async fn test_create_rejects_past_date_and_bad_json() {
    let (app, _) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(event_body("Old News", "Town Hall", "2025-04-01T10:00:00Z", 5)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["details"][0]["message"],
        "Event date cannot be in the past"
    );

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/events")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_or_malformed_id() {
    let (app, _) = test_app();

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/events/00000000-0000-4000-8000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Event not found");

    let (status, _) = send(&app, Method::GET, "/api/events/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters_and_sorting() {
    let (app, _) = test_app();

    create(&app, event_body("Picnic", "Central Park", "2025-06-20T12:00:00Z", 10)).await;
    create(&app, event_body("Morning Yoga", "Beach", "2025-06-05T07:00:00Z", 10)).await;
    create(&app, event_body("Car Meet", "Parking Lot B", "2025-07-02T19:00:00Z", 10)).await;
    create(&app, event_body("Book Club", "Library", "2025-05-20T19:00:00Z", 10)).await;
    create(&app, event_body("Late Night Talk", "Cafe", "2025-06-30T21:00:00Z", 10)).await;

    let (status, body) = send(&app, Method::GET, "/api/events", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);
    assert_eq!(
        titles(&body),
        vec!["Book Club", "Morning Yoga", "Picnic", "Late Night Talk", "Car Meet"]
    );

    let (_, body) = send(&app, Method::GET, "/api/events?location=Park", None).await;
    assert_eq!(titles(&body), vec!["Picnic", "Car Meet"]);

    let (_, body) = send(&app, Method::GET, "/api/events?search=YOGA", None).await;
    assert_eq!(titles(&body), vec!["Morning Yoga"]);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/events?startDate=2025-06-01&endDate=2025-06-30",
        None,
    )
    .await;
    assert_eq!(body["count"], 3);
    assert_eq!(titles(&body), vec!["Morning Yoga", "Picnic", "Late Night Talk"]);
}

#[tokio::test]
async fn test_list_accepts_trailing_slash() {
    let (app, _) = test_app();

    create(&app, event_body("Picnic", "Central Park", "2025-06-20T12:00:00Z", 10)).await;

    let (status, body) = send(&app, Method::GET, "/api/events/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Picnic"]);
}

#[tokio::test]
async fn test_list_rejects_invalid_query() {
    let (app, _) = test_app();

    let (status, body) = send(&app, Method::GET, "/api/events?startDate=tomorrow", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "startDate");
}

#[tokio::test]
async fn test_join_until_full() {
    let (app, _) = test_app();

    let event = create(&app, event_body("Tiny Dinner", "Kitchen", "2025-06-01T19:00:00Z", 2)).await;
    let join_uri = format!("/api/events/{}/join", event["id"].as_str().unwrap());

    for expected in 1..=2 {
        let (status, body) = send(&app, Method::POST, &join_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Successfully joined the event");
        assert_eq!(body["data"]["currentParticipants"], expected);
    }

    let (status, body) = send(&app, Method::POST, &join_uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "EVENT_FULL");
    assert_eq!(body["error"]["message"], "Event is already full");
}

#[tokio::test]
async fn test_join_past_event() {
    let (app, clock) = test_app();

    let event = create(&app, event_body("Flash Mob", "Square", "2025-05-02T12:00:00Z", 50)).await;
    clock.advance(Duration::days(2));

    let uri = format!("/api/events/{}/join", event["id"].as_str().unwrap());
    let (status, body) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "EVENT_IN_PAST");
    assert_eq!(body["error"]["message"], "Cannot join past events");
}

#[tokio::test]
async fn test_join_unknown_event() {
    let (app, _) = test_app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/events/00000000-0000-4000-8000-000000000000/join",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_leave_event() {
    let (app, _) = test_app();

    let event = create(&app, event_body("Board Games", "Cafe", "2025-06-01T19:00:00Z", 4)).await;
    let id = event["id"].as_str().unwrap();

    let (status, body) = send(&app, Method::POST, &format!("/api/events/{id}/leave"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "NO_PARTICIPANTS");

    send(&app, Method::POST, &format!("/api/events/{id}/join"), None).await;
    let (status, body) = send(&app, Method::POST, &format!("/api/events/{id}/leave"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["currentParticipants"], 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_only_one_wins() {
    let (app, _) = test_app();

    let event = create(&app, event_body("Last Seat", "Theatre", "2025-06-01T19:00:00Z", 1)).await;
    let uri = format!("/api/events/{}/join", event["id"].as_str().unwrap());

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let app = app.clone();
            let uri = uri.clone();
            tokio::spawn(async move { send(&app, Method::POST, &uri, None).await.0 })
        })
        .collect();

    let mut ok = 0;
    let mut rejected = 0;
    for task in tasks {
        match task.await.unwrap() {
            StatusCode::OK => ok += 1,
            StatusCode::BAD_REQUEST => rejected += 1,
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(ok, 1);
    assert_eq!(rejected, 19);
}

//! Request rules applied before anything reaches the store.
//!
//! Every failing field is collected so the client sees all problems at once.

use std::ops::RangeInclusive;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::{CreateEventRequest, EventFilters, ListEventsQuery, NewEvent};

const TITLE_LEN: (usize, usize) = (3, 100);
const DESCRIPTION_LEN: (usize, usize) = (10, 1000);
const LOCATION_LEN: (usize, usize) = (3, 200);
const QUERY_LOCATION_LEN: (usize, usize) = (1, 200);
const QUERY_SEARCH_LEN: (usize, usize) = (1, 100);
const MAX_PARTICIPANTS: i64 = 10_000;
const LATITUDE: RangeInclusive<f64> = -90.0..=90.0;
const LONGITUDE: RangeInclusive<f64> = -180.0..=180.0;

// `%#z` takes `+05`, `+0530` and `+05:30`; a trailing `Z` also matches the
// literal layouts in NAIVE_FORMATS.
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y%m%dT%H%M%S%#z",
    "%Y%m%dT%H%M%#z",
];
const NAIVE_FORMATS: [&str; 7] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%MZ",
    "%Y%m%dT%H%M%S",
    "%Y%m%dT%H%M%SZ",
    "%Y%m%dT%H%M",
    "%Y%m%dT%H%MZ",
];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// An ISO 8601 value as given: either an instant or a whole calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Instant(DateTime<Utc>),
    Day(NaiveDate),
}

impl ParsedDate {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self::Instant(dt.with_timezone(&Utc)));
        }
        for format in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(raw, format) {
                return Some(Self::Instant(dt.with_timezone(&Utc)));
            }
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(Self::Instant(naive.and_utc()));
            }
        }
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
            .map(Self::Day)
    }

    /// Earliest instant covered; a day starts at UTC midnight.
    pub fn start(self) -> DateTime<Utc> {
        match self {
            Self::Instant(at) => at,
            Self::Day(day) => NaiveDateTime::from(day).and_utc(),
        }
    }

    /// Latest instant covered; a day ends at 23:59:59.999 UTC.
    pub fn end(self) -> DateTime<Utc> {
        match self {
            Self::Instant(at) => at,
            Self::Day(day) => day
                .and_hms_milli_opt(23, 59, 59, 999)
                .map(|end| end.and_utc())
                .unwrap_or_else(|| self.start()),
        }
    }
}

pub fn validate_create(
    request: CreateEventRequest,
    now: DateTime<Utc>,
) -> Result<NewEvent, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = required_text(&mut errors, "title", "Title", request.title, TITLE_LEN);
    let description = required_text(
        &mut errors,
        "description",
        "Description",
        request.description,
        DESCRIPTION_LEN,
    );
    let location = required_text(
        &mut errors,
        "location",
        "Location",
        request.location,
        LOCATION_LEN,
    );

    let latitude = bounded_float(
        &mut errors,
        "latitude",
        "Latitude must be between -90 and 90",
        request.latitude.as_ref(),
        LATITUDE,
    );
    let longitude = bounded_float(
        &mut errors,
        "longitude",
        "Longitude must be between -180 and 180",
        request.longitude.as_ref(),
        LONGITUDE,
    );

    let date = match request.date.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(FieldError::new("date", "Date is required"));
            None
        }
        Some(raw) => match ParsedDate::parse(raw) {
            None => {
                errors.push(FieldError::new("date", "Date must be a valid ISO 8601 date"));
                None
            }
            Some(parsed) if parsed.start() < now => {
                errors.push(FieldError::new("date", "Event date cannot be in the past"));
                None
            }
            Some(parsed) => Some(parsed.start()),
        },
    };

    let max_participants = match request.max_participants.as_ref() {
        None => {
            errors.push(FieldError::new(
                "maxParticipants",
                "Maximum participants is required",
            ));
            None
        }
        Some(raw) => match as_integer(raw).filter(|max| (1..=MAX_PARTICIPANTS).contains(max)) {
            Some(max) => u32::try_from(max).ok(),
            None => {
                errors.push(FieldError::new(
                    "maxParticipants",
                    format!("Maximum participants must be between 1 and {MAX_PARTICIPANTS}"),
                ));
                None
            }
        },
    };

    let current_participants = match request.current_participants.as_ref() {
        None => None,
        Some(raw) => match as_integer(raw).and_then(|current| u32::try_from(current).ok()) {
            None => {
                errors.push(FieldError::new(
                    "currentParticipants",
                    "Current participants must be a non-negative integer",
                ));
                None
            }
            Some(current) => {
                if max_participants.is_some_and(|max| current > max) {
                    errors.push(FieldError::new(
                        "currentParticipants",
                        "Current participants cannot exceed maximum participants",
                    ));
                }
                Some(current)
            }
        },
    };

    match (title, description, location, date, max_participants) {
        (Some(title), Some(description), Some(location), Some(date), Some(max_participants))
            if errors.is_empty() =>
        {
            Ok(NewEvent {
                title,
                description,
                location,
                latitude,
                longitude,
                date,
                max_participants,
                current_participants,
            })
        }
        _ => Err(errors),
    }
}

pub fn validate_query(query: ListEventsQuery) -> Result<EventFilters, Vec<FieldError>> {
    let mut errors = Vec::new();

    let location = optional_text(
        &mut errors,
        "location",
        "Location",
        query.location,
        QUERY_LOCATION_LEN,
    );
    let search = optional_text(
        &mut errors,
        "search",
        "Search query",
        query.search,
        QUERY_SEARCH_LEN,
    );
    let start_date = optional_date(&mut errors, "startDate", "Start date", query.start_date)
        .map(ParsedDate::start);
    let end_date =
        optional_date(&mut errors, "endDate", "End date", query.end_date).map(ParsedDate::end);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(EventFilters {
        location,
        search,
        start_date,
        end_date,
    })
}

fn required_text(
    errors: &mut Vec<FieldError>,
    field: &str,
    label: &str,
    value: Option<String>,
    (min, max): (usize, usize),
) -> Option<String> {
    let trimmed = value.as_deref().map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        errors.push(FieldError::new(field, format!("{label} is required")));
        return None;
    }
    check_length(errors, field, label, trimmed, (min, max))
}

fn optional_text(
    errors: &mut Vec<FieldError>,
    field: &str,
    label: &str,
    value: Option<String>,
    bounds: (usize, usize),
) -> Option<String> {
    let value = value?;
    check_length(errors, field, label, value.trim(), bounds)
}

fn check_length(
    errors: &mut Vec<FieldError>,
    field: &str,
    label: &str,
    trimmed: &str,
    (min, max): (usize, usize),
) -> Option<String> {
    let len = trimmed.chars().count();
    if len < min || len > max {
        errors.push(FieldError::new(
            field,
            format!("{label} must be between {min} and {max} characters"),
        ));
        return None;
    }
    Some(trimmed.to_string())
}

fn bounded_float(
    errors: &mut Vec<FieldError>,
    field: &str,
    message: &str,
    value: Option<&Value>,
    range: RangeInclusive<f64>,
) -> Option<f64> {
    let value = value?;
    let parsed = as_float(value).filter(|v| range.contains(v));
    if parsed.is_none() {
        errors.push(FieldError::new(field, message));
    }
    parsed
}

// JSON numbers and numeric strings both count, as they do for form input.
fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

// `20` and `20.0` are the same integer; `20.5` is not one.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn optional_date(
    errors: &mut Vec<FieldError>,
    field: &str,
    label: &str,
    value: Option<String>,
) -> Option<ParsedDate> {
    let raw = value?;
    let parsed = ParsedDate::parse(&raw);
    if parsed.is_none() {
        errors.push(FieldError::new(
            field,
            format!("{label} must be a valid ISO 8601 date"),
        ));
    }
    parsed
}

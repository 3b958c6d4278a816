use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A meetup at a place and time with a fixed number of seats.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub date: DateTime<Utc>,
    pub max_participants: u32,
    pub current_participants: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_full(&self) -> bool {
        self.current_participants >= self.max_participants
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.date < now
    }
}

/// Input for creating an event. Id and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub date: DateTime<Utc>,
    pub max_participants: u32,
    pub current_participants: Option<u32>,
}

/// Partial update; `None` leaves the field unchanged.
///
/// Coordinates are doubly optional: `Some(None)` clears them.
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<Option<f64>>,
    pub longitude: Option<Option<f64>>,
    pub date: Option<DateTime<Utc>>,
    pub max_participants: Option<u32>,
    pub current_participants: Option<u32>,
}

/// Filters for listing events. All present filters must match.
#[derive(Debug, Clone, Default)]
pub struct EventFilters {
    pub location: Option<String>,
    pub search: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl EventFilters {
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(location) = &self.location {
            if !contains_ignore_case(&event.location, location) {
                return false;
            }
        }

        if let Some(term) = &self.search {
            if !contains_ignore_case(&event.title, term)
                && !contains_ignore_case(&event.description, term)
            {
                return false;
            }
        }

        if let Some(start) = self.start_date {
            if event.date < start {
                return false;
            }
        }

        if let Some(end) = self.end_date {
            if event.date > end {
                return false;
            }
        }

        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(location: &str, title: &str, description: &str) -> Event {
        let date = Utc.with_ymd_and_hms(2025, 6, 15, 18, 0, 0).unwrap();
        Event {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            location: location.to_string(),
            latitude: None,
            longitude: None,
            date,
            max_participants: 10,
            current_participants: 0,
            created_at: date,
            updated_at: date,
        }
    }

    #[test]
    fn test_location_filter_is_case_insensitive_substring() {
        let filters = EventFilters {
            location: Some("Park".to_string()),
            ..Default::default()
        };

        assert!(filters.matches(&sample("Central Park", "Picnic", "Bring food")));
        assert!(filters.matches(&sample("parking lot", "Car meet", "Old cars")));
        assert!(!filters.matches(&sample("Library", "Book club", "Reading")));
    }

    #[test]
    fn test_search_checks_title_or_description() {
        let filters = EventFilters {
            search: Some("YOGA".to_string()),
            ..Default::default()
        };

        assert!(filters.matches(&sample("Beach", "Morning Yoga", "Stretching")));
        assert!(filters.matches(&sample("Gym", "Wellness", "Intro to yoga poses")));
        assert!(!filters.matches(&sample("Gym", "Pilates", "Core work")));
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let event = sample("Hall", "Talk", "A long talk");
        let filters = EventFilters {
            start_date: Some(event.date),
            end_date: Some(event.date),
            ..Default::default()
        };
        assert!(filters.matches(&event));
    }

    #[test]
    fn test_serializes_camel_case_and_skips_missing_coordinates() {
        let event = sample("Hall", "Talk", "A long talk");
        let json = serde_json::to_value(&event).unwrap();

        assert!(json.get("maxParticipants").is_some());
        assert!(json.get("currentParticipants").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("latitude").is_none());
    }
}

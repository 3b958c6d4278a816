//! In-memory event repository.
//!
//! Every record lives behind one `RwLock`. Mutations hold the write lock for
//! the whole check-then-modify step, so two joins racing for the last seat
//! cannot both succeed. Reads share the lock and always see whole records.

pub mod clock;
pub mod error;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Event, EventFilters, EventUpdate, NewEvent};

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::StoreError;

struct Slot {
    // Insertion sequence, used to keep list order stable for equal dates.
    seq: u64,
    event: Event,
}

#[derive(Default)]
struct Records {
    slots: HashMap<Uuid, Slot>,
    next_seq: u64,
}

pub struct EventStore {
    records: RwLock<Records>,
    clock: Arc<dyn Clock>,
}

impl EventStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: RwLock::new(Records::default()),
            clock,
        }
    }

    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn create(&self, data: NewEvent) -> Result<Event, StoreError> {
        let current = data.current_participants.unwrap_or(0);
        if current > data.max_participants {
            return Err(StoreError::ParticipantsExceedCapacity {
                current,
                max: data.max_participants,
            });
        }

        let now = self.clock.now();
        let event = Event {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            location: data.location,
            latitude: data.latitude,
            longitude: data.longitude,
            date: data.date,
            max_participants: data.max_participants,
            current_participants: current,
            created_at: now,
            updated_at: now,
        };

        let mut records = self.records.write();
        let seq = records.next_seq;
        records.next_seq += 1;
        records.slots.insert(
            event.id,
            Slot {
                seq,
                event: event.clone(),
            },
        );

        debug!(event_id = %event.id, "Event created");
        Ok(event)
    }

    /// Events matching every given filter, ascending by date.
    pub fn list(&self, filters: &EventFilters) -> Vec<Event> {
        let records = self.records.read();
        let mut matched: Vec<&Slot> = records
            .slots
            .values()
            .filter(|slot| filters.matches(&slot.event))
            .collect();

        matched.sort_by(|a, b| a.event.date.cmp(&b.event.date).then(a.seq.cmp(&b.seq)));
        matched.into_iter().map(|slot| slot.event.clone()).collect()
    }

    pub fn get(&self, id: Uuid) -> Result<Event, StoreError> {
        self.records
            .read()
            .slots
            .get(&id)
            .map(|slot| slot.event.clone())
            .ok_or(StoreError::NotFound(id))
    }

    pub fn join(&self, id: Uuid) -> Result<Event, StoreError> {
        self.mutate(id, |event, now| {
            if event.is_full() {
                return Err(StoreError::CapacityExceeded);
            }
            if event.has_started(now) {
                return Err(StoreError::InvalidTemporalState);
            }
            event.current_participants += 1;
            Ok(())
        })
    }

    pub fn leave(&self, id: Uuid) -> Result<Event, StoreError> {
        self.mutate(id, |event, _| {
            if event.current_participants == 0 {
                return Err(StoreError::EmptyParticipants);
            }
            event.current_participants -= 1;
            Ok(())
        })
    }

    /// Merges the present fields of `changes`. `id` and `created_at` are never touched.
    pub fn update(&self, id: Uuid, changes: EventUpdate) -> Result<Event, StoreError> {
        self.mutate(id, |event, _| {
            let max = changes.max_participants.unwrap_or(event.max_participants);
            let current = changes
                .current_participants
                .unwrap_or(event.current_participants);
            if current > max {
                return Err(StoreError::ParticipantsExceedCapacity { current, max });
            }

            if let Some(title) = changes.title {
                event.title = title;
            }
            if let Some(description) = changes.description {
                event.description = description;
            }
            if let Some(location) = changes.location {
                event.location = location;
            }
            if let Some(latitude) = changes.latitude {
                event.latitude = latitude;
            }
            if let Some(longitude) = changes.longitude {
                event.longitude = longitude;
            }
            if let Some(date) = changes.date {
                event.date = date;
            }
            event.max_participants = max;
            event.current_participants = current;
            Ok(())
        })
    }

    pub fn delete(&self, id: Uuid) -> bool {
        let removed = self.records.write().slots.remove(&id).is_some();
        if removed {
            debug!(event_id = %id, "Event deleted");
        }
        removed
    }

    pub fn exists(&self, id: Uuid) -> bool {
        self.records.read().slots.contains_key(&id)
    }

    pub fn count(&self) -> usize {
        self.records.read().slots.len()
    }

    // Runs `apply` on a scratch copy under the write lock and commits it only on success.
    fn mutate<F>(&self, id: Uuid, apply: F) -> Result<Event, StoreError>
    where
        F: FnOnce(&mut Event, DateTime<Utc>) -> Result<(), StoreError>,
    {
        let mut records = self.records.write();
        let slot = records.slots.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        let now = self.clock.now();
        let mut next = slot.event.clone();
        apply(&mut next, now)?;
        next.updated_at = now;
        slot.event = next.clone();

        debug!(
            event_id = %id,
            participants = next.current_participants,
            "Event updated"
        );
        Ok(next)
    }
}

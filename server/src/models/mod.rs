pub mod event;
pub mod request;

pub use event::{Event, EventFilters, EventUpdate, NewEvent};
pub use request::{CreateEventRequest, ListEventsQuery};

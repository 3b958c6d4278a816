pub mod events;
pub mod health;

pub use events::{create_event, get_event, join_event, leave_event, list_events};
pub use health::{health_check, not_found, root};

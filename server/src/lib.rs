pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;
pub mod validation;

pub use models::{Event, EventFilters, EventUpdate, NewEvent};
pub use state::AppState;
pub use store::{Clock, EventStore, FixedClock, StoreError, SystemClock};

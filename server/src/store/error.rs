use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Event {0} not found")]
    NotFound(Uuid),

    #[error("Event is already full")]
    CapacityExceeded,

    #[error("Cannot join past events")]
    InvalidTemporalState,

    #[error("No participants to remove")]
    EmptyParticipants,

    #[error("Current participants ({current}) cannot exceed maximum participants ({max})")]
    ParticipantsExceedCapacity { current: u32, max: u32 },
}

impl StoreError {
    /// Business-rule violations, as opposed to a missing record.
    pub fn is_domain(&self) -> bool {
        !matches!(self, StoreError::NotFound(_))
    }
}

mod inmemory;

pub use inmemory::InMemoryEventStore;
use skema_domain::{Attendee, CalendarEvent, EventFilter, SortOrder, SortableField, ID};
use thiserror::Error;

/// Tagged result of an Occurrence Store call, so that callers can recover
/// from "not found" and "access denied" exhaustively instead of catching
/// exceptions by type.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("The event with id: {0}, was not found")]
    NotFound(ID),
    #[error("No access to the event with id: {0}")]
    AccessDenied(ID),
    #[error("Stale event version: expected seq {expected}, got {got}")]
    Conflict { expected: i64, got: i64 },
    #[error("Invalid record handed to the store: {0}")]
    InvalidRecord(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// ACL action a search is performed for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreAction {
    Get,
    Sync,
}

/// The Occurrence Store: owns persisted base events and their recurrence
/// exceptions and knows how to expand recurrence rules. Persistence and
/// rights enforcement live behind this boundary, the facade only ever
/// talks to this trait.
#[async_trait::async_trait]
pub trait IEventStore: Send + Sync {
    /// Persists a new base event and returns the stored copy with its id
    /// assigned. Missing attendee capability tokens are minted here.
    async fn insert(&self, e: &CalendarEvent) -> Result<CalendarEvent, StoreError>;
    /// Persists changes to an event. The submitted `seq` must match the
    /// stored one (optimistic concurrency); on success the stored `seq`
    /// is incremented. Saving an exception also touches the `seq` of its
    /// base event.
    async fn save(
        &self,
        e: &CalendarEvent,
        check_busy_conflicts: bool,
    ) -> Result<CalendarEvent, StoreError>;
    async fn find(&self, event_id: &ID) -> Result<CalendarEvent, StoreError>;
    /// Missing or inaccessible ids are skipped silently
    async fn find_many(&self, event_ids: &[ID]) -> Result<Vec<CalendarEvent>, StoreError>;
    async fn find_all(
        &self,
        field: SortableField,
        order: SortOrder,
    ) -> Result<Vec<CalendarEvent>, StoreError>;
    async fn search(
        &self,
        filter: &EventFilter,
        action: StoreAction,
    ) -> Result<Vec<CalendarEvent>, StoreError>;
    async fn search_ids(
        &self,
        filter: &EventFilter,
        action: StoreAction,
    ) -> Result<Vec<ID>, StoreError>;
    async fn search_uids(
        &self,
        filter: &EventFilter,
        action: StoreAction,
    ) -> Result<Vec<String>, StoreError>;
    /// Deletes all of the given events, or none of them
    async fn delete(&self, event_ids: &[ID]) -> Result<Vec<CalendarEvent>, StoreError>;
    /// Persists a recurrence exception (or fall-out) of an already
    /// persisted base event and records its original start on the base
    /// event's exdates
    async fn create_recur_exception(
        &self,
        exception: &CalendarEvent,
        is_fallout: bool,
    ) -> Result<CalendarEvent, StoreError>;
    /// All persisted exceptions of the given base event, ordered by
    /// original start time
    async fn get_recur_exceptions(
        &self,
        base: &CalendarEvent,
        include_deleted: bool,
        filter: Option<&EventFilter>,
    ) -> Result<Vec<CalendarEvent>, StoreError>;
    /// Applies one attendee's status and display calendar choice to a
    /// persisted event, authorized by the attendee's capability token
    async fn attender_status_update(
        &self,
        event: &CalendarEvent,
        attendee: &Attendee,
        authkey: &str,
    ) -> Result<CalendarEvent, StoreError>;
    /// Persists a brand new exception carrying one attendee's status
    /// change, authorized by the attendee's capability token
    async fn attender_status_create_recur_exception(
        &self,
        exception: &CalendarEvent,
        attendee: &Attendee,
        authkey: &str,
    ) -> Result<CalendarEvent, StoreError>;
    /// Resolves the alarms of the given events in place
    async fn get_alarms(&self, events: &mut [CalendarEvent]) -> Result<(), StoreError>;
    /// Finds a persisted base event matching the candidate's `uid`
    async fn lookup_existing_event(
        &self,
        candidate: &CalendarEvent,
    ) -> Result<Option<CalendarEvent>, StoreError>;
}

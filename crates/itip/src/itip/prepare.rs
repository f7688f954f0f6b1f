use skema_domain::{CalendarEvent, Recurid};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("Cannot prepare a recurrence exception for a base event without a uid")]
    MissingUid,
}

/// Stamps an exception with the identity of its base event before it is
/// handed to the store: shared uid, a recurid keyed by the original
/// occurrence start, and the base event's calendar.
pub fn prepare_exception(
    base: &CalendarEvent,
    exception: CalendarEvent,
) -> Result<CalendarEvent, PrepareError> {
    if base.uid.is_empty() {
        return Err(PrepareError::MissingUid);
    }
    let mut exception = exception;
    exception.recurid = Some(Recurid::new(&base.uid, exception.original_start_ts()));
    exception.uid = base.uid.clone();
    exception.calendar_id = base.calendar_id.clone();
    if exception.organizer.is_none() {
        exception.organizer = base.organizer.clone();
    }
    // Exception mutations touch the base event, take its fresh state
    exception.updated = base.updated;
    Ok(exception)
}

use crate::error::SkemaError;
use crate::itip::{prepare_exception, resolve_calendar_user, to_itip};
use crate::shared::usecase::UseCase;
use skema_domain::{Attendee, AttendeeStatus, ItipEvent, ID};
use skema_infra::{SkemaContext, StoreError};

/// Applies one attendee's response status and display calendar choice to
/// a base event and to each of its non-fall-out exceptions. An exception
/// the attendee was never materialized on gets a declined attendee
/// record synthesized and persisted as a brand new exception.
#[derive(Debug)]
pub struct AttenderStatusUpdateUseCase {
    pub event: ItipEvent,
    pub attendee: Attendee,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    InvalidCalendarUser,
    /// The submission carries a recurid, which only exceptions do
    ExceptionGiven,
    MissingId,
    /// The attendee does not take part in the event, or their state on a
    /// persisted exception cannot be authorized
    NotAnAttendee,
    NotFound(ID),
    AccessDenied(ID),
    StorageError,
}

impl From<UseCaseErrors> for SkemaError {
    fn from(e: UseCaseErrors) -> Self {
        match e {
            UseCaseErrors::InvalidCalendarUser => {
                SkemaError::UnexpectedValue("The calendar user is not a known contact".into())
            }
            UseCaseErrors::ExceptionGiven => SkemaError::UnexpectedValue(
                "Recurrence exceptions have to be answered through their base event".into(),
            ),
            UseCaseErrors::MissingId => {
                SkemaError::BadClientData("Cannot update the status on an unsaved event".into())
            }
            UseCaseErrors::NotAnAttendee => {
                SkemaError::UnexpectedValue("Not an attendee of the event".into())
            }
            UseCaseErrors::NotFound(event_id) => SkemaError::NotFound(format!(
                "The event with id: {}, was not found",
                event_id
            )),
            UseCaseErrors::AccessDenied(event_id) => {
                SkemaError::AccessDenied(format!("The event with id: {}", event_id))
            }
            UseCaseErrors::StorageError => SkemaError::InternalError,
        }
    }
}

fn map_store_error(e: StoreError) -> UseCaseErrors {
    match e {
        StoreError::NotFound(event_id) => UseCaseErrors::NotFound(event_id),
        StoreError::AccessDenied(event_id) => UseCaseErrors::AccessDenied(event_id),
        _ => UseCaseErrors::StorageError,
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for AttenderStatusUpdateUseCase {
    type Response = ItipEvent;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "AttenderStatusUpdate";

    async fn execute(&mut self, ctx: &SkemaContext) -> Result<Self::Response, Self::Errors> {
        if resolve_calendar_user(&self.attendee, ctx).await.is_none() {
            return Err(UseCaseErrors::InvalidCalendarUser);
        }
        if self.event.event.recurid.is_some() {
            return Err(UseCaseErrors::ExceptionGiven);
        }
        let base_id = self
            .event
            .event
            .id
            .clone()
            .ok_or(UseCaseErrors::MissingId)?;
        let current = ctx
            .repos
            .events
            .find(&base_id)
            .await
            .map_err(map_store_error)?;

        let authkey = Attendee::get(&current.attendees, &self.attendee)
            .and_then(|a| a.status_authkey.clone())
            .ok_or(UseCaseErrors::NotAnAttendee)?;

        let updated_base = ctx
            .repos
            .events
            .attender_status_update(&current, &self.attendee, &authkey)
            .await
            .map_err(map_store_error)?;

        for exception in &self.event.exceptions {
            if exception.is_deleted {
                continue;
            }
            match &exception.id {
                None => {
                    // Not yet persisted: the attendee declines every
                    // occurrence they have not responded to
                    let mut exc = exception.clone();
                    let record = match Attendee::get(&exc.attendees, &self.attendee) {
                        Some(existing) => {
                            let mut record = existing.clone();
                            record.display_calendar_id = self.attendee.display_calendar_id.clone();
                            record
                        }
                        None => {
                            let mut record = self.attendee.clone();
                            record.status = AttendeeStatus::Declined;
                            record.status_authkey = None;
                            exc.attendees.push(record.clone());
                            record
                        }
                    };
                    let prepared = prepare_exception(&updated_base, exc)
                        .map_err(|_| UseCaseErrors::StorageError)?;
                    ctx.repos
                        .events
                        .attender_status_create_recur_exception(&prepared, &record, &authkey)
                        .await
                        .map_err(map_store_error)?;
                }
                Some(exception_id) => {
                    let exc_current = ctx
                        .repos
                        .events
                        .find(exception_id)
                        .await
                        .map_err(map_store_error)?;
                    let exc_attendee = Attendee::get(&exc_current.attendees, &self.attendee)
                        .ok_or(UseCaseErrors::NotAnAttendee)?;
                    let exc_authkey = exc_attendee
                        .status_authkey
                        .clone()
                        .ok_or(UseCaseErrors::NotAnAttendee)?;
                    let mut record = exc_attendee.clone();
                    record.status = self.attendee.status;
                    record.display_calendar_id = self.attendee.display_calendar_id.clone();
                    ctx.repos
                        .events
                        .attender_status_update(&exc_current, &record, &exc_authkey)
                        .await
                        .map_err(map_store_error)?;
                }
            }
        }

        let fresh = ctx
            .repos
            .events
            .find(&base_id)
            .await
            .map_err(map_store_error)?;
        to_itip(fresh, &self.attendee, None, ctx)
            .await
            .map_err(map_store_error)
    }
}

use crate::error::SkemaError;
use crate::itip::{
    diff_exceptions, emailless_attendees, from_itip, prepare_exception, resolve_calendar_user,
    to_itip,
};
use crate::shared::usecase::UseCase;
use skema_domain::{Attendee, EventFilter, ItipEvent, ID};
use skema_infra::{SkemaContext, StoreError};

/// Applies a submitted iTIP shape to a persisted event: the base event
/// is saved and the embedded exception set is migrated against the
/// persisted one (create / update / delete, untouched fall-outs left
/// alone).
#[derive(Debug)]
pub struct UpdateEventUseCase {
    pub event: ItipEvent,
    pub check_busy_conflicts: bool,
    pub cal_user: Attendee,
    /// Externally imposed date window, if any. Fall-outs outside of it
    /// are invisible to the client and must not be treated as removed.
    pub filter: Option<EventFilter>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    InvalidCalendarUser,
    ExceptionGiven,
    /// The submission has not been persisted before
    MissingId,
    NotFound(ID),
    AccessDenied(ID),
    StaleEvent(String),
    /// The exception sets cannot be keyed by original start time
    IntegrityFault(i64),
    StorageError,
}

impl From<UseCaseErrors> for SkemaError {
    fn from(e: UseCaseErrors) -> Self {
        match e {
            UseCaseErrors::InvalidCalendarUser => {
                SkemaError::UnexpectedValue("The calendar user is not a known contact".into())
            }
            UseCaseErrors::ExceptionGiven => SkemaError::UnexpectedValue(
                "Recurrence exceptions have to be updated through their base event".into(),
            ),
            UseCaseErrors::MissingId => {
                SkemaError::BadClientData("Cannot update an event without an id".into())
            }
            UseCaseErrors::NotFound(event_id) => SkemaError::NotFound(format!(
                "The event with id: {}, was not found",
                event_id
            )),
            UseCaseErrors::AccessDenied(event_id) => {
                SkemaError::AccessDenied(format!("The event with id: {}", event_id))
            }
            UseCaseErrors::StaleEvent(msg) => SkemaError::Conflict(msg),
            UseCaseErrors::IntegrityFault(start_ts) => SkemaError::DataIntegrity(format!(
                "Multiple recurrence exceptions share the original start time: {}",
                start_ts
            )),
            UseCaseErrors::StorageError => SkemaError::InternalError,
        }
    }
}

fn map_store_error(e: StoreError) -> UseCaseErrors {
    match e {
        StoreError::NotFound(event_id) => UseCaseErrors::NotFound(event_id),
        StoreError::AccessDenied(event_id) => UseCaseErrors::AccessDenied(event_id),
        StoreError::Conflict { expected, got } => {
            UseCaseErrors::StaleEvent(format!("expected seq: {}, got: {}", expected, got))
        }
        _ => UseCaseErrors::StorageError,
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateEventUseCase {
    type Response = ItipEvent;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "UpdateEvent";

    async fn execute(&mut self, ctx: &SkemaContext) -> Result<Self::Response, Self::Errors> {
        if resolve_calendar_user(&self.cal_user, ctx).await.is_none() {
            return Err(UseCaseErrors::InvalidCalendarUser);
        }
        if self.event.event.recurid.is_some() {
            return Err(UseCaseErrors::ExceptionGiven);
        }
        let event_id = self
            .event
            .event
            .id
            .clone()
            .ok_or(UseCaseErrors::MissingId)?;

        let current = ctx
            .repos
            .events
            .find(&event_id)
            .await
            .map_err(map_store_error)?;
        // Period criteria are disabled here: an exception just outside
        // the sync window is still persisted state and must not be
        // mistaken for a deletion
        let exception_filter = self.filter.as_ref().map(|f| f.without_timespan());
        let persisted = ctx
            .repos
            .events
            .get_recur_exceptions(&current, true, exception_filter.as_ref())
            .await
            .map_err(map_store_error)?;
        // The client only ever saw the windowed view, exceptions hidden
        // by it stay out of the migration entirely
        let (visible, hidden): (Vec<_>, Vec<_>) = persisted.iter().cloned().partition(|e| {
            self.filter.as_ref().map(|f| f.matches(e)).unwrap_or(true)
        });
        let emailless = {
            let mut attendees = current.attendees.clone();
            for exception in &persisted {
                attendees.extend(exception.attendees.iter().cloned());
            }
            emailless_attendees(&attendees, ctx).await
        };
        let submission = from_itip(
            self.event.clone(),
            &current,
            &persisted,
            &emailless,
            &self.cal_user,
        );

        let now = ctx.sys.get_timestamp_millis();
        let mut base = submission.event;
        base.ensure_attendee(&self.cal_user, ctx.config.status_authkey_len);

        let submitted_starts: Vec<i64> = submission
            .exceptions
            .iter()
            .map(|s| s.event.original_start_ts())
            .collect();
        let persisted_active: Vec<_> = visible.iter().filter(|e| !e.is_deleted).cloned().collect();
        let for_diff: Vec<_> = submission
            .exceptions
            .into_iter()
            .filter(|s| s.untouched || !s.event.is_deleted)
            .collect();
        let migration =
            diff_exceptions(&persisted_active, for_diff).map_err(|e| match e {
                crate::itip::MigrationError::DataIntegrity(start_ts) => {
                    UseCaseErrors::IntegrityFault(start_ts)
                }
            })?;

        let delete_ids: Vec<ID> = migration
            .to_delete
            .iter()
            .filter_map(|e| e.id.clone())
            .collect();
        if !delete_ids.is_empty() {
            ctx.repos
                .events
                .delete(&delete_ids)
                .await
                .map_err(map_store_error)?;
        }

        // Brand new exceptions must not show up in the base event's
        // excluded dates yet, that would confuse the recurrence
        // computation of the create below
        let create_starts: Vec<i64> = migration
            .to_create
            .iter()
            .map(|e| e.original_start_ts())
            .collect();
        base.exdates = submitted_starts
            .into_iter()
            .chain(hidden.iter().map(|e| e.original_start_ts()))
            .filter(|ts| !create_starts.contains(ts))
            .collect();
        base.exdates.sort_unstable();
        base.exdates.dedup();
        base.updated = now;

        let saved = ctx
            .repos
            .events
            .save(&base, self.check_busy_conflicts)
            .await
            .map_err(map_store_error)?;
        let saved_id = saved.id.clone().ok_or(UseCaseErrors::StorageError)?;

        for exception in migration.to_create {
            let mut prepared =
                prepare_exception(&saved, exception).map_err(|_| UseCaseErrors::StorageError)?;
            prepared.created = now;
            prepared.updated = now;
            ctx.repos
                .events
                .create_recur_exception(&prepared, false)
                .await
                .map_err(map_store_error)?;
        }
        for update in migration.to_update {
            let mut prepared = prepare_exception(&saved, update.event)
                .map_err(|_| UseCaseErrors::StorageError)?;
            // The counterpart's seq was read within this request, copy
            // it forward so the optimistic check passes
            prepared.seq = update.current.seq;
            prepared.updated = now;
            ctx.repos
                .events
                .save(&prepared, self.check_busy_conflicts)
                .await
                .map_err(map_store_error)?;
        }

        // Exception mutations bump the base event's seq, return the
        // fresh state instead of the locally computed one
        let fresh = ctx
            .repos
            .events
            .find(&saved_id)
            .await
            .map_err(map_store_error)?;
        to_itip(fresh, &self.cal_user, self.filter.as_ref(), ctx)
            .await
            .map_err(map_store_error)
    }
}

use crate::error::SkemaError;
use crate::itip::{
    emailless_attendees, from_itip, prepare_exception, resolve_calendar_user, to_itip,
};
use crate::shared::usecase::UseCase;
use skema_domain::{Attendee, ItipEvent, ID};
use skema_infra::{SkemaContext, StoreError};

/// Persists a new event together with its embedded recurrence
/// exceptions. Exceptions can never be created as top level events.
#[derive(Debug)]
pub struct CreateEventUseCase {
    pub event: ItipEvent,
    pub cal_user: Attendee,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    InvalidCalendarUser,
    /// The submission carries a recurid, which only exceptions do
    ExceptionGiven,
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
                "Recurrence exceptions have to be created through their base event".into(),
            ),
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
impl UseCase for CreateEventUseCase {
    type Response = ItipEvent;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "CreateEvent";

    async fn execute(&mut self, ctx: &SkemaContext) -> Result<Self::Response, Self::Errors> {
        if resolve_calendar_user(&self.cal_user, ctx).await.is_none() {
            return Err(UseCaseErrors::InvalidCalendarUser);
        }
        if self.event.event.recurid.is_some() {
            return Err(UseCaseErrors::ExceptionGiven);
        }

        // There is no prior state, the submission is its own baseline
        let baseline = self.event.event.clone();
        let emailless = emailless_attendees(&baseline.attendees, ctx).await;
        let submission = from_itip(self.event.clone(), &baseline, &[], &emailless, &self.cal_user);

        let now = ctx.sys.get_timestamp_millis();
        let mut base = submission.event;
        base.ensure_uid();
        // Capability tokens are minted by the store, never taken from
        // the submission
        for attendee in base.attendees.iter_mut() {
            attendee.status_authkey = None;
        }
        base.ensure_attendee(&self.cal_user, ctx.config.status_authkey_len);
        base.created = now;
        base.updated = now;

        let saved = ctx
            .repos
            .events
            .insert(&base)
            .await
            .map_err(map_store_error)?;
        let saved_id = saved.id.clone().ok_or(UseCaseErrors::StorageError)?;

        for exception in submission.exceptions {
            let mut prepared = prepare_exception(&saved, exception.event)
                .map_err(|_| UseCaseErrors::StorageError)?;
            for attendee in prepared.attendees.iter_mut() {
                attendee.status_authkey = None;
            }
            prepared.created = now;
            prepared.updated = now;
            let is_fallout = prepared.is_deleted;
            ctx.repos
                .events
                .create_recur_exception(&prepared, is_fallout)
                .await
                .map_err(map_store_error)?;
        }

        let fresh = ctx
            .repos
            .events
            .find(&saved_id)
            .await
            .map_err(map_store_error)?;
        to_itip(fresh, &self.cal_user, None, ctx)
            .await
            .map_err(map_store_error)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use skema_domain::{
        AttendeeType, CalendarEvent, Contact, EventFilter, Recurid, RecurringScope,
    };
    use skema_infra::{setup_context, StoreAction};

    async fn calendar_user(ctx: &SkemaContext) -> Attendee {
        let contact = Contact::new("me", Some("me@example.com"));
        ctx.repos.contacts.insert(&contact).await.unwrap();
        Attendee::new(contact.id, AttendeeType::User)
    }

    #[tokio::test]
    async fn rejects_a_recurid_bearing_submission_without_writing() {
        let ctx = setup_context();
        let cal_user = calendar_user(&ctx).await;

        let mut event = CalendarEvent::new(ID::default());
        event.recurid = Some(Recurid::new(&event.uid, 1_000));
        let mut usecase = CreateEventUseCase {
            event: ItipEvent {
                event,
                exceptions: Vec::new(),
            },
            cal_user,
        };
        let res = usecase.execute(&ctx).await;
        assert!(matches!(res, Err(UseCaseErrors::ExceptionGiven)));

        let stored = ctx
            .repos
            .events
            .search(&EventFilter::default(), StoreAction::Get)
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn creates_base_event_with_embedded_exceptions() {
        let ctx = setup_context();
        let cal_user = calendar_user(&ctx).await;

        let mut base = CalendarEvent::new(ID::default());
        base.recurrence = Some(Default::default());
        base.start_ts = 1_000;

        let mut exception = base.clone();
        exception.recurid = Some(Recurid::new(&base.uid, 2_000));
        exception.start_ts = 2_500;
        let mut fallout = base.clone();
        fallout.recurid = Some(Recurid::new(&base.uid, 3_000));
        fallout.is_deleted = true;

        let mut usecase = CreateEventUseCase {
            event: ItipEvent {
                event: base,
                exceptions: vec![exception, fallout],
            },
            cal_user: cal_user.clone(),
        };
        let res = usecase.execute(&ctx).await.unwrap();

        // the calendar user was materialized as attendee
        assert!(skema_domain::Attendee::get(&res.event.attendees, &cal_user).is_some());
        // both the exception and the fall-out are embedded
        assert_eq!(res.exceptions.len(), 2);
        assert_eq!(res.event.exdates, vec![2_000, 3_000]);

        // the fall-out is not an addressable event
        let visible = ctx
            .repos
            .events
            .search(
                &EventFilter::default().with_scope(RecurringScope::ExceptionsOnly),
                StoreAction::Get,
            )
            .await
            .unwrap();
        assert_eq!(visible.len(), 1);
    }

    #[tokio::test]
    async fn submitted_capability_tokens_are_discarded() {
        let ctx = setup_context();
        let cal_user = calendar_user(&ctx).await;

        let mut base = CalendarEvent::new(ID::default());
        let mut forged = cal_user.clone();
        forged.status_authkey = Some("forged".into());
        base.attendees = vec![forged];

        let mut usecase = CreateEventUseCase {
            event: ItipEvent {
                event: base,
                exceptions: Vec::new(),
            },
            cal_user: cal_user.clone(),
        };
        let res = usecase.execute(&ctx).await.unwrap();

        let stored = ctx
            .repos
            .events
            .find(res.event.id.as_ref().unwrap())
            .await
            .unwrap();
        let own = skema_domain::Attendee::get(&stored.attendees, &cal_user).unwrap();
        assert_ne!(own.status_authkey.as_deref(), Some("forged"));
        assert!(own.status_authkey.is_some());
    }
}

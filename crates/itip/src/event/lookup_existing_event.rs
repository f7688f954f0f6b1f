use crate::error::SkemaError;
use crate::itip::{resolve_calendar_user, to_itip};
use crate::shared::usecase::UseCase;
use skema_domain::{Attendee, CalendarEvent, ItipEvent};
use skema_infra::SkemaContext;

/// Looks up a persisted base event matching an externally submitted
/// candidate, by shared uid. Sync clients use this to tell a brand new
/// invitation apart from one already known to the server.
#[derive(Debug)]
pub struct LookupExistingEventUseCase {
    pub candidate: CalendarEvent,
    pub cal_user: Attendee,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    InvalidCalendarUser,
    StorageError,
}

impl From<UseCaseErrors> for SkemaError {
    fn from(e: UseCaseErrors) -> Self {
        match e {
            UseCaseErrors::InvalidCalendarUser => {
                SkemaError::UnexpectedValue("The calendar user is not a known contact".into())
            }
            UseCaseErrors::StorageError => SkemaError::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for LookupExistingEventUseCase {
    type Response = Option<ItipEvent>;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "LookupExistingEvent";

    async fn execute(&mut self, ctx: &SkemaContext) -> Result<Self::Response, Self::Errors> {
        if resolve_calendar_user(&self.cal_user, ctx).await.is_none() {
            return Err(UseCaseErrors::InvalidCalendarUser);
        }
        let existing = ctx
            .repos
            .events
            .lookup_existing_event(&self.candidate)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;
        match existing {
            Some(event) => to_itip(event, &self.cal_user, None, ctx)
                .await
                .map(Some)
                .map_err(|_| UseCaseErrors::StorageError),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use skema_domain::{AttendeeType, Contact, ID};
    use skema_infra::setup_context;

    #[tokio::test]
    async fn finds_events_by_uid() {
        let ctx = setup_context();
        let contact = Contact::new("me", Some("me@example.com"));
        ctx.repos.contacts.insert(&contact).await.unwrap();
        let cal_user = Attendee::new(contact.id, AttendeeType::User);

        let stored = ctx
            .repos
            .events
            .insert(&CalendarEvent::new(ID::default()))
            .await
            .unwrap();

        let mut candidate = CalendarEvent::new(ID::default());
        candidate.uid = stored.uid.clone();
        let mut usecase = LookupExistingEventUseCase {
            candidate,
            cal_user: cal_user.clone(),
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.map(|e| e.event.id), Some(stored.id));

        let mut usecase = LookupExistingEventUseCase {
            candidate: CalendarEvent::new(ID::default()),
            cal_user,
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert!(res.is_none());
    }
}

use crate::error::SkemaError;
use crate::itip::{resolve_calendar_user, to_itip};
use crate::shared::usecase::UseCase;
use skema_domain::{Attendee, EventFilter, ItipEvent, ID};
use skema_infra::{SkemaContext, StoreError};

/// Fetches one event in its externally visible shape, exceptions
/// embedded and the calendar user's perspective applied.
#[derive(Debug)]
pub struct GetEventUseCase {
    pub event_id: ID,
    pub cal_user: Attendee,
    pub filter: Option<EventFilter>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    InvalidCalendarUser,
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
impl UseCase for GetEventUseCase {
    type Response = ItipEvent;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetEvent";

    async fn execute(&mut self, ctx: &SkemaContext) -> Result<Self::Response, Self::Errors> {
        if resolve_calendar_user(&self.cal_user, ctx).await.is_none() {
            return Err(UseCaseErrors::InvalidCalendarUser);
        }
        let event = ctx
            .repos
            .events
            .find(&self.event_id)
            .await
            .map_err(map_store_error)?;
        to_itip(event, &self.cal_user, self.filter.as_ref(), ctx)
            .await
            .map_err(map_store_error)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use skema_domain::{AttendeeType, CalendarEvent, Contact};
    use skema_infra::setup_context;

    async fn calendar_user(ctx: &SkemaContext) -> Attendee {
        let contact = Contact::new("me", Some("me@example.com"));
        ctx.repos.contacts.insert(&contact).await.unwrap();
        Attendee::new(contact.id, AttendeeType::User)
    }

    #[tokio::test]
    async fn get_nonexisting_event() {
        let ctx = setup_context();
        let cal_user = calendar_user(&ctx).await;
        let mut usecase = GetEventUseCase {
            event_id: Default::default(),
            cal_user,
            filter: None,
        };
        let res = usecase.execute(&ctx).await;
        assert!(matches!(res, Err(UseCaseErrors::NotFound(_))));
    }

    #[tokio::test]
    async fn rejects_unknown_calendar_user() {
        let ctx = setup_context();
        let event = ctx
            .repos
            .events
            .insert(&CalendarEvent::new(ID::default()))
            .await
            .unwrap();
        let mut usecase = GetEventUseCase {
            event_id: event.id.unwrap(),
            cal_user: Attendee::new(ID::new(), AttendeeType::User),
            filter: None,
        };
        let res = usecase.execute(&ctx).await;
        assert!(matches!(res, Err(UseCaseErrors::InvalidCalendarUser)));
    }

    #[tokio::test]
    async fn get_existing_event() {
        let ctx = setup_context();
        let cal_user = calendar_user(&ctx).await;
        let event = ctx
            .repos
            .events
            .insert(&CalendarEvent::new(ID::default()))
            .await
            .unwrap();

        let mut usecase = GetEventUseCase {
            event_id: event.id.clone().unwrap(),
            cal_user,
            filter: None,
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.event.id, event.id);
        assert!(res.exceptions.is_empty());
    }
}

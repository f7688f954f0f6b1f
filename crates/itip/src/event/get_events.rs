use crate::error::SkemaError;
use crate::itip::{resolve_calendar_user, to_itip_many};
use crate::shared::usecase::UseCase;
use skema_domain::{Attendee, EventFilter, ItipEvent, ID};
use skema_infra::SkemaContext;

/// Fetches a batch of events by id. Missing and inaccessible ids are
/// left out of the result instead of failing the batch.
#[derive(Debug)]
pub struct GetEventsUseCase {
    pub event_ids: Vec<ID>,
    pub cal_user: Attendee,
    pub filter: Option<EventFilter>,
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
impl UseCase for GetEventsUseCase {
    type Response = Vec<ItipEvent>;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetEvents";

    async fn execute(&mut self, ctx: &SkemaContext) -> Result<Self::Response, Self::Errors> {
        if resolve_calendar_user(&self.cal_user, ctx).await.is_none() {
            return Err(UseCaseErrors::InvalidCalendarUser);
        }
        let events = ctx
            .repos
            .events
            .find_many(&self.event_ids)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;
        Ok(to_itip_many(events, &self.cal_user, self.filter.as_ref(), ctx).await)
    }
}

use crate::error::SkemaError;
use crate::itip::{resolve_calendar_user, to_itip_many};
use crate::shared::usecase::UseCase;
use skema_domain::{Attendee, ItipEvent, SortOrder, SortableField};
use skema_infra::SkemaContext;

#[derive(Debug)]
pub struct GetAllEventsUseCase {
    pub field: SortableField,
    pub order: SortOrder,
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
impl UseCase for GetAllEventsUseCase {
    type Response = Vec<ItipEvent>;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetAllEvents";

    async fn execute(&mut self, ctx: &SkemaContext) -> Result<Self::Response, Self::Errors> {
        if resolve_calendar_user(&self.cal_user, ctx).await.is_none() {
            return Err(UseCaseErrors::InvalidCalendarUser);
        }
        let events = ctx
            .repos
            .events
            .find_all(self.field, self.order)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;
        Ok(to_itip_many(events, &self.cal_user, None, ctx).await)
    }
}

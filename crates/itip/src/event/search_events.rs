use super::visible_ids::visible_event_ids;
use crate::error::SkemaError;
use crate::itip::{resolve_calendar_user, to_itip_many};
use crate::shared::usecase::UseCase;
use skema_domain::{Attendee, EventFilter, ItipEvent, Pagination};
use skema_infra::{SkemaContext, StoreAction};

/// Searches events by filter. The visible id set is resolved first,
/// paginated, and only the requested page is fetched and converted.
#[derive(Debug)]
pub struct SearchEventsUseCase {
    pub filter: EventFilter,
    pub pagination: Option<Pagination>,
    pub action: StoreAction,
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
impl UseCase for SearchEventsUseCase {
    type Response = Vec<ItipEvent>;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "SearchEvents";

    async fn execute(&mut self, ctx: &SkemaContext) -> Result<Self::Response, Self::Errors> {
        if resolve_calendar_user(&self.cal_user, ctx).await.is_none() {
            return Err(UseCaseErrors::InvalidCalendarUser);
        }
        let ids = visible_event_ids(&self.filter, self.action, ctx)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;

        let max = ctx.config.search_max_page_size;
        let (skip, limit) = match &self.pagination {
            Some(p) => (p.skip, p.limit.min(max)),
            None => (0, max),
        };
        let page: Vec<_> = ids.into_iter().skip(skip).take(limit).collect();

        let events = ctx
            .repos
            .events
            .find_many(&page)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;
        Ok(to_itip_many(events, &self.cal_user, Some(&self.filter), ctx).await)
    }
}

/// The size of the id set `SearchEvents` would page through. Best
/// effort: exceptions dropped later during conversion still count here.
#[derive(Debug)]
pub struct SearchEventsCountUseCase {
    pub filter: EventFilter,
    pub action: StoreAction,
    pub cal_user: Attendee,
}

#[async_trait::async_trait(?Send)]
impl UseCase for SearchEventsCountUseCase {
    type Response = usize;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "SearchEventsCount";

    async fn execute(&mut self, ctx: &SkemaContext) -> Result<Self::Response, Self::Errors> {
        if resolve_calendar_user(&self.cal_user, ctx).await.is_none() {
            return Err(UseCaseErrors::InvalidCalendarUser);
        }
        visible_event_ids(&self.filter, self.action, ctx)
            .await
            .map(|ids| ids.len())
            .map_err(|_| UseCaseErrors::StorageError)
    }
}

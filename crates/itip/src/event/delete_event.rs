use crate::error::SkemaError;
use crate::itip::resolve_calendar_user;
use crate::shared::usecase::UseCase;
use skema_domain::{Attendee, ID};
use skema_infra::{SkemaContext, StoreError};

/// Deletes events together with all of their recurrence exceptions, as
/// one all-or-nothing store operation.
#[derive(Debug)]
pub struct DeleteEventsUseCase {
    pub event_ids: Vec<ID>,
    pub cal_user: Attendee,
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
impl UseCase for DeleteEventsUseCase {
    type Response = Vec<ID>;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "DeleteEvents";

    async fn execute(&mut self, ctx: &SkemaContext) -> Result<Self::Response, Self::Errors> {
        if resolve_calendar_user(&self.cal_user, ctx).await.is_none() {
            return Err(UseCaseErrors::InvalidCalendarUser);
        }
        let mut ids = self.event_ids.clone();
        for event_id in &self.event_ids {
            let event = ctx
                .repos
                .events
                .find(event_id)
                .await
                .map_err(map_store_error)?;
            let exceptions = ctx
                .repos
                .events
                .get_recur_exceptions(&event, true, None)
                .await
                .map_err(map_store_error)?;
            for exception_id in exceptions.into_iter().filter_map(|e| e.id) {
                if !ids.contains(&exception_id) {
                    ids.push(exception_id);
                }
            }
        }
        ctx.repos
            .events
            .delete(&ids)
            .await
            .map_err(map_store_error)?;
        Ok(ids)
    }
}

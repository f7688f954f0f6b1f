mod error;
pub mod event;
mod itip;
pub mod shared;

pub use error::SkemaError;
pub use event::{
    AttenderStatusUpdateUseCase, CreateEventUseCase, DeleteEventsUseCase, GetAllEventsUseCase,
    GetEventUseCase, GetEventsUseCase, LookupExistingEventUseCase, SearchEventsCountUseCase,
    SearchEventsUseCase, UpdateEventUseCase,
};
pub use itip::{
    diff_exceptions, from_itip, prepare_exception, to_itip, to_itip_many, ExceptionMigration,
    ExceptionUpdate, ItipSubmission, MigrationError, PrepareError, SubmittedException,
};
pub use shared::usecase::{execute, UseCase};

pub mod attender_status_update;
pub mod create_event;
pub mod delete_event;
pub mod get_all_events;
pub mod get_event;
pub mod get_events;
pub mod lookup_existing_event;
pub mod search_events;
pub mod update_event;
mod visible_ids;

pub use attender_status_update::AttenderStatusUpdateUseCase;
pub use create_event::CreateEventUseCase;
pub use delete_event::DeleteEventsUseCase;
pub use get_all_events::GetAllEventsUseCase;
pub use get_event::GetEventUseCase;
pub use get_events::GetEventsUseCase;
pub use lookup_existing_event::LookupExistingEventUseCase;
pub use search_events::{SearchEventsCountUseCase, SearchEventsUseCase};
pub use update_event::UpdateEventUseCase;

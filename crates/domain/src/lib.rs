mod alarm;
mod attendee;
mod contact;
mod event;
mod filter;
mod recurid;
mod shared;
mod timespan;

pub use alarm::Alarm;
pub use attendee::{Attendee, AttendeeStatus, AttendeeType};
pub use contact::Contact;
pub use event::{CalendarEvent, ItipEvent, Transparency};
pub use filter::{EventFilter, Pagination, RecurringScope, SortOrder, SortableField};
pub use recurid::{InvalidRecuridError, Recurid};
pub use shared::entity::{InvalidIDError, ID};
pub use shared::recurrence::{RRuleFrequency, RRuleOptions};
pub use timespan::TimeSpan;
